use serde::Serialize;

use super::defaults::{
    DEFAULT_INPUT_HISTORY_SIZE, DEFAULT_INPUT_INDICATOR, DEFAULT_INPUT_PREFIX,
    DEFAULT_OUTPUT_READ_ATTEMPTS,
};
use super::ConfigSource;

/// Settings the console I/O pipeline reads from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleSettings {
    /// Acquire-read-delete attempts per signal file before it is abandoned.
    pub output_read_attempts: u32,
    /// Interactive editor on a TTY; `false` falls back to plain line reads.
    pub use_new_input_system: bool,
    pub input_history_size: usize,
    pub input_prefix: String,
    pub input_left_indicator: String,
    pub input_right_indicator: String,
    /// Pick new input row colors at the start of every line.
    pub random_input_colors: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            output_read_attempts: DEFAULT_OUTPUT_READ_ATTEMPTS,
            use_new_input_system: true,
            input_history_size: DEFAULT_INPUT_HISTORY_SIZE,
            input_prefix: DEFAULT_INPUT_PREFIX.to_string(),
            input_left_indicator: DEFAULT_INPUT_INDICATOR.to_string(),
            input_right_indicator: DEFAULT_INPUT_INDICATOR.to_string(),
            random_input_colors: false,
        }
    }
}

impl ConsoleSettings {
    pub fn from_source(source: &impl ConfigSource) -> Self {
        let defaults = Self::default();
        Self {
            output_read_attempts: clamp_to_u32(source.get_int(
                "output_read_attempts",
                i64::from(defaults.output_read_attempts),
            )),
            use_new_input_system: source
                .get_bool("use_new_input_system", defaults.use_new_input_system),
            input_history_size: usize::try_from(source.get_int(
                "input_history_size",
                defaults.input_history_size as i64,
            ))
            .unwrap_or(0),
            input_prefix: source.get_string("input_prefix", &defaults.input_prefix),
            input_left_indicator: source
                .get_string("input_left_indicator", &defaults.input_left_indicator),
            input_right_indicator: source
                .get_string("input_right_indicator", &defaults.input_right_indicator),
            random_input_colors: source
                .get_bool("random_input_colors", defaults.random_input_colors),
        }
    }
}

fn clamp_to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
