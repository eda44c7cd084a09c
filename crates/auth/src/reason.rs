use serde::{Deserialize, Serialize};

/// Machine-readable cause attached to an authentication denial.
///
/// Rendered as `errors.reason` in the error envelope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthReason {
    InvalidCredentials,
    EmailNotVerified,
    PhoneNotVerified,
    AccountDeleted,
    TokenExpired,
    TokenInvalid,
    InsufficientPermissions,
}

impl AuthReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::EmailNotVerified => "email_not_verified",
            Self::PhoneNotVerified => "phone_not_verified",
            Self::AccountDeleted => "account_deleted",
            Self::TokenExpired => "token_expired",
            Self::TokenInvalid => "token_invalid",
            Self::InsufficientPermissions => "insufficient_permissions",
        }
    }
}

impl core::fmt::Display for AuthReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
