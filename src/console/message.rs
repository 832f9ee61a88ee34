use crossterm::style::Color;

/// One run of text drawn in a single color. `None` keeps the terminal default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredMessage {
    pub text: String,
    pub color: Option<Color>,
}

impl ColoredMessage {
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    /// Width in characters; the editor and sectioner count chars, not bytes.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Concatenate the text of every segment.
pub fn plain_text(segments: &[ColoredMessage]) -> String {
    segments.iter().map(|segment| segment.text.as_str()).collect()
}
