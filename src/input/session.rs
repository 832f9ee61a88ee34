use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::{self, BufRead};

use super::render::{plan_render, random_color_seed, InputLayout, RenderAction};
use super::{EditKey, EditorState, HistoryBuffer, KeyOutcome};
use crate::config::ConsoleSettings;
use crate::console::{Color, Console};

/// Blocking source of editor keys. `Ok(None)` means the input is closed.
pub trait KeySource {
    fn next_key(&mut self) -> io::Result<Option<EditKey>>;
}

/// Reads key events from the terminal; expects raw mode to be enabled.
#[derive(Debug, Default)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn next_key(&mut self) -> io::Result<Option<EditKey>> {
        loop {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
                        continue;
                    }
                    return Ok(Some(map_key(key)));
                }
                // Width is re-read on every render.
                Event::Resize(..) => return Ok(Some(EditKey::Ignored)),
                _ => {}
            }
        }
    }
}

pub fn map_key(key: KeyEvent) -> EditKey {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => EditKey::Interrupt,
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => EditKey::Ignored,
        KeyCode::Char(ch) => EditKey::Char(ch),
        KeyCode::Backspace => EditKey::Backspace,
        KeyCode::Delete => EditKey::Delete,
        KeyCode::Left => EditKey::Left,
        KeyCode::Right => EditKey::Right,
        KeyCode::Home => EditKey::Home,
        KeyCode::End => EditKey::End,
        KeyCode::PageUp => EditKey::PageUp,
        KeyCode::PageDown => EditKey::PageDown,
        KeyCode::Up => EditKey::Up,
        KeyCode::Down => EditKey::Down,
        KeyCode::Enter => EditKey::Enter,
        _ => EditKey::Ignored,
    }
}

/// One console input session: owns the history and editor state and renders
/// through the shared console.
pub struct InputSession {
    history: HistoryBuffer,
    state: EditorState,
    layout: InputLayout,
    random_colors: bool,
}

impl InputSession {
    pub fn new(settings: &ConsoleSettings) -> Self {
        Self {
            history: HistoryBuffer::new(settings.input_history_size),
            state: EditorState::new(),
            layout: InputLayout::from_settings(settings),
            random_colors: settings.random_input_colors,
        }
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn layout(&self) -> &InputLayout {
        &self.layout
    }

    /// Edit one line interactively. Returns `Ok(None)` on interrupt or when the
    /// key source closes; the input row is erased in that case.
    pub fn read_line(
        &mut self,
        console: &Console,
        keys: &mut dyn KeySource,
    ) -> io::Result<Option<String>> {
        if self.random_colors {
            self.layout.randomize_colors(random_color_seed());
        }
        loop {
            self.render(console);
            let Some(key) = keys.next_key()? else {
                console.hide_input();
                return Ok(None);
            };
            let page_step = self.layout.page_step(console.width());
            match self.state.apply(key, &mut self.history, page_step) {
                KeyOutcome::Continue => {}
                KeyOutcome::Submitted(line) => {
                    self.render(console);
                    return Ok(Some(line));
                }
                KeyOutcome::Interrupted => {
                    console.hide_input();
                    return Ok(None);
                }
            }
        }
    }

    /// Read one full line without the editor; history is still recorded.
    /// Returns `Ok(None)` at end of input.
    pub fn read_line_plain(&mut self, input: &mut dyn BufRead) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let line = buf.trim_end_matches(['\r', '\n']).to_string();
        if !line.is_empty() {
            self.history.add(line.clone());
        }
        Ok(Some(line))
    }

    fn render(&mut self, console: &Console) {
        let plan = plan_render(&mut self.state, &self.layout, console.width());
        if let Some(warning) = &plan.warning {
            console.write_status(warning, Color::Red);
        }
        let result = match plan.action {
            RenderAction::Unchanged => Ok(()),
            RenderAction::MoveCursor(column) => console.move_input_cursor(column),
            RenderAction::Redraw { segments, cursor } => console.show_input(segments, cursor),
        };
        if let Err(err) = result {
            crate::log_debug(&format!("input render failed: {err}"));
            self.state.invalidate_render();
        }
    }
}
