//! Server output: signal files are acquired, classified and dispatched.

mod acquire;
mod classify;
mod event;
mod reader;
mod server_mod;
mod watcher;

pub use acquire::{
    acquire, AcquireError, AcquirePhase, Acquired, Backoff, SignalFs, StdSignalFs, ThreadBackoff,
};
pub use classify::{
    classify, level_colors, logtype_color, Classification, DisplayForm, DEFAULT_COLOR,
};
pub use event::{EventKind, SignalEvent};
pub use reader::{FileOutcome, OutputReader, ROUND_RESTART_DIRECTIVE};
pub use server_mod::{ModVersion, ParseVersionError, ServerMod, ServerModKind};
pub use watcher::{is_signal_file, pending_signal_files, SignalWatcher};
