//! Domain error model.

use thiserror::Error;

/// Result type used across the core crates.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (validation, malformed
/// identifiers, capability failures). Transport concerns belong to the API
/// crate, which maps these into error envelopes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A duration string did not match `<digits>[smhd]`.
    #[error("invalid duration format: {0}")]
    InvalidDuration(String),

    /// A hashing backend rejected the input or the stored hash.
    #[error("hashing failed: {0}")]
    Hashing(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration(msg.into())
    }

    pub fn hashing(msg: impl Into<String>) -> Self {
        Self::Hashing(msg.into())
    }
}
