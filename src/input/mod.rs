//! Console input: history, line sectioning, the key-driven editor and line
//! dispatch to commands and the server.

mod dispatch;
mod editor;
mod history;
mod render;
mod sections;
mod session;

pub use dispatch::{DispatchOutcome, LineDispatcher};
pub use editor::{EditKey, EditorState, KeyOutcome};
pub use history::{HistoryBuffer, HistoryError};
pub use render::{plan_render, InputLayout, RenderAction, RenderPlan};
pub use sections::{DisplaySection, LineSections, SectionError};
pub use session::{map_key, CrosstermKeys, InputSession, KeySource};
