//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

use basekit_core::AppEnvironment;

/// Initialize tracing/logging for the process.
///
/// `RUST_LOG` wins; otherwise the environment picks the default level.
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(environment: AppEnvironment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_filter()));

    // JSON logs + timestamps; span fields (correlation_id, method, uri) are
    // flattened into each line.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
