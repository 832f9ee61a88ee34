use super::defaults::{
    MAX_INDICATOR_CHARS, MAX_INPUT_HISTORY_SIZE, MAX_OUTPUT_READ_ATTEMPTS, MAX_SERVER_CMD_BYTES,
};
use super::{AppConfig, ConsoleSettings};
use anyhow::{bail, Context, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values before anything is spawned.
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.session_dir {
            if dir.exists() && !dir.is_dir() {
                bail!("--session-dir {} is not a directory", dir.display());
            }
        }
        if let Some(cmd) = &self.server_cmd {
            if cmd.len() > MAX_SERVER_CMD_BYTES {
                bail!("--server-cmd exceeds {MAX_SERVER_CMD_BYTES} bytes");
            }
            self.server_argv()?;
        }
        Ok(())
    }

    /// Split `--server-cmd` into program + arguments.
    pub fn server_argv(&self) -> Result<Option<Vec<String>>> {
        let Some(cmd) = &self.server_cmd else {
            return Ok(None);
        };
        let argv = shell_words::split(cmd)
            .with_context(|| format!("--server-cmd is not a valid command line: {cmd}"))?;
        if argv.is_empty() {
            bail!("--server-cmd must not be empty");
        }
        Ok(Some(argv))
    }
}

impl ConsoleSettings {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_OUTPUT_READ_ATTEMPTS).contains(&self.output_read_attempts) {
            bail!(
                "output_read_attempts must be between 1 and {MAX_OUTPUT_READ_ATTEMPTS}, got {}",
                self.output_read_attempts
            );
        }
        if self.input_history_size > MAX_INPUT_HISTORY_SIZE {
            bail!(
                "input_history_size must be at most {MAX_INPUT_HISTORY_SIZE}, got {}",
                self.input_history_size
            );
        }
        validate_marker("input_prefix", &self.input_prefix)?;
        validate_marker("input_left_indicator", &self.input_left_indicator)?;
        validate_marker("input_right_indicator", &self.input_right_indicator)?;
        Ok(())
    }
}

fn validate_marker(key: &str, value: &str) -> Result<()> {
    if value.chars().any(char::is_control) {
        bail!("{key} must not contain control characters");
    }
    if value.chars().count() > MAX_INDICATOR_CHARS {
        bail!("{key} must be at most {MAX_INDICATOR_CHARS} characters");
    }
    Ok(())
}
