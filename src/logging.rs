//! Diagnostic log initialization.
//!
//! The pager owns the terminal, so diagnostics go to a fixed file that can
//! be watched with `tail -f` from another terminal. The path is not
//! configurable and the log is append-only across runs.

use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "/tmp";
const LOG_FILE: &str = "jlv.log";

/// Install the file-backed tracing subscriber. Respects `RUST_LOG`,
/// defaulting to "info". Failure to initialize is swallowed: the pager must
/// run even when its debug log cannot.
pub fn init() {
    let appender = tracing_appender::rolling::never(LOG_DIR, LOG_FILE);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(appender)
        .with_ansi(false)
        .try_init();
}
