//! Tracing, logging and request correlation (shared setup).

use basekit_core::AppEnvironment;

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(environment: AppEnvironment) {
    tracing::init(environment);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Correlation identifiers carried across a request.
pub mod correlation;

pub use correlation::{CORRELATION_HEADER, CorrelationId};
