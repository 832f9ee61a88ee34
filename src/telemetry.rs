use crate::config::AppConfig;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

const TRACE_FILTER_ENV: &str = "MULTIADMIN_TRACE_FILTER";
/// Crate events at debug, dependencies (notify, crossterm) only when they warn.
const DEFAULT_TRACE_FILTER: &str = "warn,multiadmin=debug";

pub(crate) fn tracing_log_path() -> PathBuf {
    env::var("MULTIADMIN_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("multiadmin_trace.jsonl"))
}

fn trace_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_TRACE_FILTER))
}

/// Route `tracing` events to a JSON lines file. Nothing is installed when file
/// logging is off, so the events are dropped without touching the console.
///
/// `MULTIADMIN_TRACE_FILTER` overrides the default target filter.
pub fn init_tracing(config: &AppConfig) {
    if !config.logging_enabled() {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let path = tracing_log_path();
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(err) => {
                crate::log_debug(&format!("trace log {} unavailable: {err}", path.display()));
                return;
            }
        };
        let directives = env::var(TRACE_FILTER_ENV).ok();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_env_filter(trace_filter(directives.as_deref()))
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                pid = std::process::id(),
                trace_log = %path.display(),
                "multiadmin tracing started"
            );
        }
    });
}
