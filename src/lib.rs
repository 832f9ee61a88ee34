pub mod commands;
pub mod config;
pub mod console;
pub mod handlers;
pub mod input;
mod lock;
mod logging;
pub mod output;
pub mod relay;
mod telemetry;
pub mod terminal_restore;

pub(crate) use lock::lock_or_recover;
pub use logging::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
pub use telemetry::init_tracing;
