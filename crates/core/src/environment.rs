//! Build mode of the running process.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Deployment environment, read once at startup.
///
/// Decides whether diagnostics (stack traces) may leave the process and how
/// chatty the default log filter is.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    #[default]
    Development,
    Staging,
    Production,
    Test,
}

impl AppEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Stack traces are only ever rendered into responses in development.
    pub fn exposes_stack_traces(&self) -> bool {
        self.is_development()
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Production => "info",
            Self::Development | Self::Staging | Self::Test => "debug",
        }
    }
}

impl core::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppEnvironment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(DomainError::validation(format!(
                "environment must be one of: development, staging, production, test (got '{other}')"
            ))),
        }
    }
}
