use crossterm::style::Color;
use std::io;
use std::sync::Mutex;

use super::{ColoredMessage, TerminalSink};
use crate::lock_or_recover;

/// Input row currently shown below the output, repainted after every status line.
#[derive(Debug, Clone)]
struct InputLine {
    segments: Vec<ColoredMessage>,
    cursor: u16,
}

struct ConsoleInner {
    sink: Box<dyn TerminalSink>,
    input: Option<InputLine>,
}

/// The one terminal output channel. Every writer (signal reader, line editor,
/// commands, supervisor) goes through this lock, so multi-segment writes and
/// cursor moves never interleave.
pub struct Console {
    inner: Mutex<ConsoleInner>,
    headless: bool,
}

impl Console {
    pub fn new(sink: Box<dyn TerminalSink>) -> Self {
        Self {
            inner: Mutex::new(ConsoleInner { sink, input: None }),
            headless: false,
        }
    }

    /// A console that prints status lines only; input rendering is a no-op.
    pub fn headless(sink: Box<dyn TerminalSink>) -> Self {
        Self {
            headless: true,
            ..Self::new(sink)
        }
    }

    pub fn is_headless(&self) -> bool {
        self.headless
    }

    pub fn width(&self) -> u16 {
        lock_or_recover(&self.inner, "Console::width").sink.width()
    }

    /// Print one line. Write failures only reach the debug log.
    pub fn write_line(&self, segments: &[ColoredMessage]) {
        let mut inner = lock_or_recover(&self.inner, "Console::write_line");
        if let Err(err) = write_line_locked(&mut inner, segments) {
            crate::log_debug(&format!("console write failed: {err}"));
        }
    }

    pub fn write_status(&self, text: &str, color: Color) {
        self.write_line(&[ColoredMessage::new(text, color)]);
    }

    /// Replace the input row and place the cursor at `cursor` (absolute column).
    pub fn show_input(&self, segments: Vec<ColoredMessage>, cursor: u16) -> io::Result<()> {
        if self.headless {
            return Ok(());
        }
        let mut inner = lock_or_recover(&self.inner, "Console::show_input");
        let line = InputLine { segments, cursor };
        let result = paint_input(inner.sink.as_mut(), &line);
        inner.input = Some(line);
        result
    }

    /// Move only the terminal cursor within the input row.
    pub fn move_input_cursor(&self, cursor: u16) -> io::Result<()> {
        if self.headless {
            return Ok(());
        }
        let mut inner = lock_or_recover(&self.inner, "Console::move_input_cursor");
        if let Some(input) = inner.input.as_mut() {
            input.cursor = cursor;
        }
        inner.sink.move_to_column(cursor)?;
        inner.sink.flush()
    }

    /// Erase the input row and stop repainting it.
    pub fn hide_input(&self) {
        if self.headless {
            return;
        }
        let mut inner = lock_or_recover(&self.inner, "Console::hide_input");
        if inner.input.take().is_some() {
            let sink = inner.sink.as_mut();
            if let Err(err) = sink.clear_line().and_then(|()| sink.flush()) {
                crate::log_debug(&format!("console clear failed: {err}"));
            }
        }
    }
}

fn write_line_locked(inner: &mut ConsoleInner, segments: &[ColoredMessage]) -> io::Result<()> {
    if inner.input.is_some() {
        inner.sink.clear_line()?;
    }
    inner.sink.write_segments(segments)?;
    inner.sink.newline()?;
    if let Some(input) = &inner.input {
        paint_input(inner.sink.as_mut(), input)?;
    }
    inner.sink.flush()
}

fn paint_input(sink: &mut dyn TerminalSink, line: &InputLine) -> io::Result<()> {
    sink.clear_line()?;
    sink.write_segments(&line.segments)?;
    sink.move_to_column(line.cursor)?;
    sink.flush()
}
