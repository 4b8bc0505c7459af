// ==========================================
// Logging Initialization
// ==========================================
// tracing + tracing-subscriber, level controlled via environment
// variable.
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging system.
///
/// # Environment
/// - RUST_LOG: level filter (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=exam_scheduler=trace
///
/// # Example
/// ```no_run
/// use exam_scheduler::logging;
/// logging::init();
/// ```
pub fn init() {
    // Level from the environment, default info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Initialize logging for tests.
///
/// More verbose, and tolerant of repeated initialization across test
/// binaries.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
