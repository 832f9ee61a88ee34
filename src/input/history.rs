use std::collections::VecDeque;
use std::fmt;

/// Out-of-range access on a [`HistoryBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "history index {index} out of range (len {len})")
            }
        }
    }
}

impl std::error::Error for HistoryError {}

/// Fixed-capacity list of submitted lines. Index 0 is always the newest entry.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<String>,
    max_count: usize,
}

impl HistoryBuffer {
    pub fn new(max_count: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_count),
            max_count,
        }
    }

    pub fn add(&mut self, text: impl Into<String>) {
        if self.max_count == 0 {
            return;
        }
        while self.entries.len() >= self.max_count {
            self.entries.pop_back();
        }
        self.entries.push_front(text.into());
    }

    /// Evict the oldest entry. No-op when empty.
    pub fn remove_from_end(&mut self) {
        self.entries.pop_back();
    }

    pub fn replace(&mut self, text: impl Into<String>, index: usize) -> Result<(), HistoryError> {
        let len = self.entries.len();
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(HistoryError::IndexOutOfRange { index, len })?;
        *slot = text.into();
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<&str, HistoryError> {
        self.entries
            .get(index)
            .map(String::as_str)
            .ok_or(HistoryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, count: usize) -> HistoryBuffer {
        let mut history = HistoryBuffer::new(capacity);
        for i in 0..count {
            history.add(format!("Test{i}"));
        }
        history
    }

    #[test]
    fn add_keeps_newest_at_front() {
        let history = filled(6, 3);
        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0), Ok("Test2"));
        assert_eq!(history.get(2), Ok("Test0"));
    }

    #[test]
    fn add_beyond_capacity_evicts_oldest() {
        let history = filled(2, 6);
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["Test5", "Test4"]);
    }

    #[test]
    fn count_never_exceeds_capacity() {
        for capacity in 0..5 {
            for calls in 0..8 {
                let history = filled(capacity, calls);
                assert_eq!(history.len(), calls.min(capacity));
                if calls > 0 && capacity > 0 {
                    assert_eq!(history.get(0), Ok(format!("Test{}", calls - 1).as_str()));
                }
            }
        }
    }

    #[test]
    fn remove_from_end_drops_oldest() {
        let mut history = filled(6, 6);
        history.remove_from_end();
        history.remove_from_end();
        assert_eq!(
            history.iter().collect::<Vec<_>>(),
            vec!["Test5", "Test4", "Test3", "Test2"]
        );
    }

    #[test]
    fn remove_from_end_on_empty_is_noop() {
        let mut history = HistoryBuffer::new(3);
        history.remove_from_end();
        assert!(history.is_empty());
        let mut history = filled(3, 2);
        for _ in 0..5 {
            history.remove_from_end();
        }
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn replace_changes_only_target_index() {
        let mut history = filled(6, 6);
        history.replace("Replaced", 2).expect("in range");
        assert_eq!(history.len(), 6);
        assert_eq!(history.get(2), Ok("Replaced"));
        assert_eq!(history.get(1), Ok("Test4"));
        assert_eq!(history.get(3), Ok("Test2"));
    }

    #[test]
    fn out_of_range_access_fails() {
        let mut history = filled(4, 2);
        assert_eq!(
            history.get(2),
            Err(HistoryError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(history.replace("x", 5).is_err());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut history = HistoryBuffer::new(0);
        history.add("ignored");
        assert!(history.is_empty());
        assert_eq!(history.max_count(), 0);
    }
}
