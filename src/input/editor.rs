use super::{HistoryBuffer, LineSections};

/// Key events the line editor understands, decoupled from the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Enter,
    Interrupt,
    /// Anything that should only trigger a re-render (resize, unmapped keys).
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Submitted(String),
    Interrupted,
}

/// What was last drawn on the input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderedInput {
    pub(crate) text: String,
    pub(crate) cursor: usize,
    pub(crate) width: usize,
}

/// Working state of one interactive editing session.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    line: Vec<char>,
    cursor: usize,
    draft: String,
    recall: Option<usize>,
    pub(crate) sections: Option<LineSections>,
    pub(crate) section_index: usize,
    pub(crate) rendered: Option<RenderedInput>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.line.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// `None` while composing a fresh line.
    pub fn recall_index(&self) -> Option<usize> {
        self.recall
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn sections(&self) -> Option<&LineSections> {
        self.sections.as_ref()
    }

    /// Forget what was drawn so the next render repaints everything.
    pub fn invalidate_render(&mut self) {
        self.rendered = None;
        self.sections = None;
    }

    pub fn apply(
        &mut self,
        key: EditKey,
        history: &mut HistoryBuffer,
        page_step: usize,
    ) -> KeyOutcome {
        match key {
            EditKey::Char(ch) => {
                self.line.insert(self.cursor, ch);
                self.cursor += 1;
            }
            EditKey::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.line.remove(self.cursor);
                }
            }
            EditKey::Delete => {
                if self.cursor < self.line.len() {
                    self.line.remove(self.cursor);
                }
            }
            EditKey::Left => self.cursor = self.cursor.saturating_sub(1),
            EditKey::Right => self.cursor += 1,
            EditKey::Home => self.cursor = 0,
            EditKey::End => self.cursor = self.line.len(),
            EditKey::PageUp => self.cursor = self.cursor.saturating_sub(page_step.max(1)),
            EditKey::PageDown => self.cursor += page_step.max(1),
            EditKey::Up => self.recall_older(history),
            EditKey::Down => self.recall_newer(history),
            EditKey::Enter => {
                let line = self.text();
                if !line.is_empty() {
                    history.add(line.clone());
                }
                self.reset();
                return KeyOutcome::Submitted(line);
            }
            EditKey::Interrupt => {
                self.reset();
                return KeyOutcome::Interrupted;
            }
            EditKey::Ignored => {}
        }

        if self.recall.is_none() {
            self.draft = self.text();
        }
        self.cursor = self.cursor.min(self.line.len());
        KeyOutcome::Continue
    }

    fn recall_older(&mut self, history: &HistoryBuffer) {
        if history.is_empty() {
            return;
        }
        let next = self
            .recall
            .map_or(0, |index| index + 1)
            .min(history.len() - 1);
        if self.recall.is_none() {
            self.draft = self.text();
        }
        self.recall = Some(next);
        self.load_recalled(history);
    }

    fn recall_newer(&mut self, history: &HistoryBuffer) {
        match self.recall {
            None => {}
            Some(0) => {
                self.recall = None;
                self.line = self.draft.chars().collect();
            }
            Some(index) => {
                self.recall = Some(index - 1);
                self.load_recalled(history);
            }
        }
    }

    fn load_recalled(&mut self, history: &HistoryBuffer) {
        let Some(index) = self.recall else {
            return;
        };
        match history.get(index) {
            Ok(text) => self.line = text.chars().collect(),
            Err(err) => {
                crate::log_debug(&format!("history recall failed: {err}"));
                self.recall = None;
                self.line = self.draft.chars().collect();
            }
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(state: &mut EditorState, history: &mut HistoryBuffer, text: &str) {
        for ch in text.chars() {
            assert_eq!(state.apply(EditKey::Char(ch), history, 10), KeyOutcome::Continue);
        }
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut history = HistoryBuffer::new(5);
        let mut state = EditorState::new();
        type_text(&mut state, &mut history, "helo");
        state.apply(EditKey::Left, &mut history, 10);
        type_text(&mut state, &mut history, "l");
        assert_eq!(state.text(), "hello");
        assert_eq!(state.cursor(), 4);
    }

    #[test]
    fn backspace_and_delete_respect_bounds() {
        let mut history = HistoryBuffer::new(5);
        let mut state = EditorState::new();
        state.apply(EditKey::Backspace, &mut history, 10);
        type_text(&mut state, &mut history, "abc");
        state.apply(EditKey::Delete, &mut history, 10);
        assert_eq!(state.text(), "abc");
        state.apply(EditKey::Backspace, &mut history, 10);
        assert_eq!(state.text(), "ab");
        state.apply(EditKey::Home, &mut history, 10);
        state.apply(EditKey::Delete, &mut history, 10);
        assert_eq!(state.text(), "b");
        assert_eq!(state.cursor(), 0);
        state.apply(EditKey::Backspace, &mut history, 10);
        assert_eq!(state.text(), "b");
    }

    #[test]
    fn cursor_moves_are_clamped() {
        let mut history = HistoryBuffer::new(5);
        let mut state = EditorState::new();
        type_text(&mut state, &mut history, "abc");
        state.apply(EditKey::Right, &mut history, 10);
        assert_eq!(state.cursor(), 3);
        state.apply(EditKey::Home, &mut history, 10);
        state.apply(EditKey::Left, &mut history, 10);
        assert_eq!(state.cursor(), 0);
        state.apply(EditKey::End, &mut history, 10);
        assert_eq!(state.cursor(), 3);
    }

    #[test]
    fn page_keys_move_by_step() {
        let mut history = HistoryBuffer::new(5);
        let mut state = EditorState::new();
        type_text(&mut state, &mut history, "0123456789abcdefghij");
        state.apply(EditKey::PageUp, &mut history, 6);
        assert_eq!(state.cursor(), 14);
        state.apply(EditKey::PageUp, &mut history, 6);
        state.apply(EditKey::PageUp, &mut history, 6);
        state.apply(EditKey::PageUp, &mut history, 6);
        assert_eq!(state.cursor(), 0);
        state.apply(EditKey::PageDown, &mut history, 6);
        assert_eq!(state.cursor(), 6);
        state.apply(EditKey::PageDown, &mut history, 100);
        assert_eq!(state.cursor(), 20);
    }

    #[test]
    fn enter_submits_records_and_resets() {
        let mut history = HistoryBuffer::new(5);
        let mut state = EditorState::new();
        type_text(&mut state, &mut history, "players");
        assert_eq!(
            state.apply(EditKey::Enter, &mut history, 10),
            KeyOutcome::Submitted("players".to_string())
        );
        assert_eq!(history.get(0), Ok("players"));
        assert!(state.is_empty());
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.recall_index(), None);
    }

    #[test]
    fn empty_submission_is_not_recorded() {
        let mut history = HistoryBuffer::new(5);
        let mut state = EditorState::new();
        assert_eq!(
            state.apply(EditKey::Enter, &mut history, 10),
            KeyOutcome::Submitted(String::new())
        );
        assert!(history.is_empty());
    }

    #[test]
    fn recall_walks_history_and_restores_draft() {
        let mut history = HistoryBuffer::new(5);
        history.add("first");
        history.add("second");
        let mut state = EditorState::new();
        type_text(&mut state, &mut history, "dra");

        state.apply(EditKey::Up, &mut history, 10);
        assert_eq!(state.text(), "second");
        assert_eq!(state.recall_index(), Some(0));
        assert_eq!(state.draft(), "dra");

        state.apply(EditKey::Up, &mut history, 10);
        assert_eq!(state.text(), "first");
        state.apply(EditKey::Up, &mut history, 10);
        assert_eq!(state.text(), "first");
        assert_eq!(state.recall_index(), Some(1));

        state.apply(EditKey::Down, &mut history, 10);
        assert_eq!(state.text(), "second");
        state.apply(EditKey::Down, &mut history, 10);
        assert_eq!(state.text(), "dra");
        assert_eq!(state.recall_index(), None);
        state.apply(EditKey::Down, &mut history, 10);
        assert_eq!(state.text(), "dra");
    }

    #[test]
    fn editing_recalled_line_keeps_draft() {
        let mut history = HistoryBuffer::new(5);
        history.add("status");
        let mut state = EditorState::new();
        type_text(&mut state, &mut history, "x");
        state.apply(EditKey::Up, &mut history, 10);
        state.apply(EditKey::End, &mut history, 10);
        type_text(&mut state, &mut history, "!");
        assert_eq!(state.text(), "status!");
        assert_eq!(state.draft(), "x");
        state.apply(EditKey::Down, &mut history, 10);
        assert_eq!(state.text(), "x");
    }

    #[test]
    fn recall_on_empty_history_is_noop() {
        let mut history = HistoryBuffer::new(5);
        let mut state = EditorState::new();
        type_text(&mut state, &mut history, "abc");
        state.apply(EditKey::Up, &mut history, 10);
        assert_eq!(state.text(), "abc");
        assert_eq!(state.recall_index(), None);
    }

    #[test]
    fn recalled_shorter_line_clamps_cursor() {
        let mut history = HistoryBuffer::new(5);
        history.add("ab");
        let mut state = EditorState::new();
        type_text(&mut state, &mut history, "abcdef");
        state.apply(EditKey::Up, &mut history, 10);
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn interrupt_resets_state() {
        let mut history = HistoryBuffer::new(5);
        let mut state = EditorState::new();
        type_text(&mut state, &mut history, "abc");
        assert_eq!(
            state.apply(EditKey::Interrupt, &mut history, 10),
            KeyOutcome::Interrupted
        );
        assert!(state.is_empty());
        assert!(history.is_empty());
    }
}
