//! Stable message keys and their default English text.
//!
//! Keys are dotted identifiers clients may translate; the text is what the
//! gateway sends in `message`.

pub mod keys {
    pub const OPERATION_SUCCESS: &str = "operation.success";
    pub const API_INFO: &str = "api.info";
    pub const HEALTH_CHECK_SUCCESS: &str = "health.check.success";
    pub const HEALTH_CHECK_DETAILED_SUCCESS: &str = "health.check.detailed.success";
    pub const ERROR_INTERNAL: &str = "error.internal";
    pub const ERROR_NOT_FOUND: &str = "error.not_found";
    pub const ERROR_METHOD_NOT_ALLOWED: &str = "error.method_not_allowed";
    pub const ERROR_VALIDATION: &str = "error.validation";
}

pub mod messages {
    pub const OPERATION_SUCCESS: &str = "Operation completed successfully";
    pub const API_INFO: &str = "Backend API";
    pub const HEALTH_CHECK_SUCCESS: &str = "Service is healthy";
    pub const HEALTH_CHECK_DETAILED_SUCCESS: &str = "Detailed health check completed";
    pub const ERROR_INTERNAL: &str = "An error occurred";
}

use serde::Serialize;

use crate::envelope::Envelope;

/// `200 success` with the generic "operation completed" wording, for
/// handlers that have nothing more specific to say.
pub fn operation_completed<T: Serialize>(data: T, path: impl Into<String>) -> Envelope<T> {
    Envelope::success(data, messages::OPERATION_SUCCESS)
        .with_message_key(keys::OPERATION_SUCCESS)
        .with_path(path)
}
