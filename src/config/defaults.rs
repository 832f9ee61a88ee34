pub const DEFAULT_CONFIG_FILE: &str = "scp_multiadmin.cfg";

pub const DEFAULT_OUTPUT_READ_ATTEMPTS: u32 = 100;
pub const MAX_OUTPUT_READ_ATTEMPTS: u32 = 10_000;

pub const DEFAULT_INPUT_HISTORY_SIZE: usize = 25;
pub const MAX_INPUT_HISTORY_SIZE: usize = 10_000;

pub const DEFAULT_INPUT_PREFIX: &str = "> ";
pub const DEFAULT_INPUT_INDICATOR: &str = "...";

pub(crate) const MAX_INDICATOR_CHARS: usize = 16;
pub(crate) const MAX_SERVER_CMD_BYTES: usize = 8 * 1024;
