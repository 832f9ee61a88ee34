//! Shared terminal output: colored segments, terminal primitives, the single
//! serialized console every writer goes through, and rich-text decoration.

mod markup;
mod message;
mod output;
mod terminal;
#[cfg(test)]
pub(crate) mod test_support;

pub use markup::{MarkupDecorator, RichTextDecorator};
pub use message::{plain_text, ColoredMessage};
pub use output::Console;
pub use terminal::{CrosstermTerminal, TerminalSink, DEFAULT_TERMINAL_WIDTH};

pub use crossterm::style::Color;
