use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use basekit_core::UserId;

use crate::UserRole;

/// JWT claims model (transport-agnostic).
///
/// `iat` and `exp` are Unix seconds, as registered JWT claims are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    pub email: String,

    #[serde(default)]
    pub roles: Vec<UserRole>,

    #[serde(default)]
    pub is_email_verified: bool,

    #[serde(default)]
    pub is_phone_number_verified: bool,

    /// Issued-at.
    pub iat: i64,

    /// Expiration.
    pub exp: i64,
}

impl JwtClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::token`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    fn claims(iat: i64, exp: i64) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            email: "ada@example.com".into(),
            roles: vec![UserRole::User],
            is_email_verified: true,
            is_phone_number_verified: false,
            iat,
            exp,
        }
    }

    #[test]
    fn window_is_half_open() {
        let now = Utc::now();
        let iat = now.timestamp();
        let c = claims(iat, iat + 60);

        assert_eq!(validate_claims(&c, now), Ok(()));
        assert_eq!(
            validate_claims(&c, now + Duration::seconds(60)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&c, now - Duration::seconds(5)),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let c = claims(100, 100);
        assert_eq!(
            validate_claims(&c, Utc::now()),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn wire_names_are_camel_case() {
        let c = claims(1, 2);
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["isEmailVerified"], json!(true));
        assert_eq!(value["isPhoneNumberVerified"], json!(false));
        assert_eq!(value["roles"], json!(["user"]));
        assert_eq!(value["iat"], json!(1));
    }
}
