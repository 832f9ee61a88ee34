//! Command-line parsing, the key/value config file and the resolved console settings.

mod defaults;
mod settings;
mod source;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use defaults::{
    DEFAULT_CONFIG_FILE, DEFAULT_INPUT_HISTORY_SIZE, DEFAULT_INPUT_INDICATOR, DEFAULT_INPUT_PREFIX,
    DEFAULT_OUTPUT_READ_ATTEMPTS, MAX_INPUT_HISTORY_SIZE, MAX_OUTPUT_READ_ATTEMPTS,
};
pub use settings::ConsoleSettings;
pub use source::{ConfigFile, ConfigSource};

/// CLI options for the MultiAdmin supervisor console.
#[derive(Debug, Parser, Clone)]
#[command(about = "MultiAdmin game-server supervisor console", author, version)]
pub struct AppConfig {
    /// Game server command line (split like a shell would)
    #[arg(long = "server-cmd", env = "MULTIADMIN_SERVER_CMD")]
    pub server_cmd: Option<String>,

    /// Key/value config file (`key: value` per line)
    #[arg(long = "config", env = "MULTIADMIN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config_path: PathBuf,

    /// Directory the server writes signal files into (defaults to a fresh temp dir)
    #[arg(long = "session-dir", env = "MULTIADMIN_SESSION_DIR")]
    pub session_dir: Option<PathBuf>,

    /// Disable the interactive line editor and read plain lines from stdin
    #[arg(long = "headless", env = "MULTIADMIN_HEADLESS", default_value_t = false)]
    pub headless: bool,

    /// Print the resolved console settings as JSON and exit
    #[arg(long = "print-settings", default_value_t = false)]
    pub print_settings: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "MULTIADMIN_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "MULTIADMIN_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging console input and player names (debug log only)
    #[arg(
        long = "log-content",
        env = "MULTIADMIN_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

impl AppConfig {
    pub fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }
}
