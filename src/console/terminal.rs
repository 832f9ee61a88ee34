use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::{Print, ResetColor, SetForegroundColor},
    terminal::{size as terminal_size, Clear, ClearType},
};
use std::io::{self, Write};

use super::ColoredMessage;

pub const DEFAULT_TERMINAL_WIDTH: u16 = 80;

/// Low-level terminal primitives the console needs.
pub trait TerminalSink: Send {
    fn write_segments(&mut self, segments: &[ColoredMessage]) -> io::Result<()>;
    /// Return to column 0 and erase the current row.
    fn clear_line(&mut self) -> io::Result<()>;
    fn newline(&mut self) -> io::Result<()>;
    fn move_to_column(&mut self, column: u16) -> io::Result<()>;
    fn width(&self) -> u16;
    fn flush(&mut self) -> io::Result<()>;
}

/// ANSI terminal backed by crossterm commands.
pub struct CrosstermTerminal<W: Write + Send> {
    out: W,
    fixed_width: Option<u16>,
}

impl CrosstermTerminal<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> CrosstermTerminal<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            fixed_width: None,
        }
    }

    /// Pin the reported width instead of querying the tty.
    pub fn with_width(mut self, width: u16) -> Self {
        self.fixed_width = Some(width);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TerminalSink for CrosstermTerminal<W> {
    fn write_segments(&mut self, segments: &[ColoredMessage]) -> io::Result<()> {
        for segment in segments {
            if segment.text.is_empty() {
                continue;
            }
            // Raw mode does not translate LF, so multi-line messages need CR too.
            let text = segment.text.replace("\r\n", "\n").replace('\n', "\r\n");
            match segment.color {
                Some(color) => {
                    queue!(self.out, SetForegroundColor(color), Print(text), ResetColor)?
                }
                None => queue!(self.out, Print(text))?,
            }
        }
        Ok(())
    }

    fn clear_line(&mut self) -> io::Result<()> {
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))
    }

    fn newline(&mut self) -> io::Result<()> {
        queue!(self.out, Print("\r\n"))
    }

    fn move_to_column(&mut self, column: u16) -> io::Result<()> {
        queue!(self.out, MoveToColumn(column))
    }

    fn width(&self) -> u16 {
        self.fixed_width.unwrap_or_else(|| {
            terminal_size()
                .map(|(cols, _)| cols)
                .ok()
                .filter(|cols| *cols > 0)
                .unwrap_or(DEFAULT_TERMINAL_WIDTH)
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
