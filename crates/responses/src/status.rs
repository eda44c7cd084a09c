//! Closed enumerations that appear on the wire.

use serde::{Deserialize, Serialize};

/// Kind discriminator carried in every envelope's `status` field.
///
/// Paginated and cursor envelopes are success-shaped and report `success`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
    Warning,
    Info,
    Partial,
    Pending,
    Processing,
    Cancelled,
    Timeout,
    Unauthorized,
}

impl ResponseStatus {
    pub const ALL: [ResponseStatus; 10] = [
        Self::Success,
        Self::Error,
        Self::Warning,
        Self::Info,
        Self::Partial,
        Self::Pending,
        Self::Processing,
        Self::Cancelled,
        Self::Timeout,
        Self::Unauthorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Partial => "partial",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Cancelled => "cancelled",
            Self::Timeout => "timeout",
            Self::Unauthorized => "unauthorized",
        }
    }
}

impl core::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a long-running operation was cancelled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationReason {
    UserRequested,
    Superseded,
    Timeout,
    SystemShutdown,
    Error,
}

/// Which budget an operation ran out of.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutType {
    Request,
    Gateway,
    Database,
    ExternalService,
    Processing,
}
