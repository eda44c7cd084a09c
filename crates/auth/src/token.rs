//! Bearer token verification and issuance (HS256).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AuthReason, AuthUser, JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("token could not be issued: {0}")]
    Encoding(String),

    #[error("no refresh secret configured")]
    RefreshDisabled,
}

impl TokenError {
    pub fn reason(&self) -> AuthReason {
        match self {
            Self::Claims(TokenValidationError::Expired) => AuthReason::TokenExpired,
            _ => AuthReason::TokenInvalid,
        }
    }
}

/// Resolves a bearer credential into claims.
///
/// Shared across requests, so implementations must tolerate concurrent
/// independent calls.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Body of a token-issuing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Seconds until `access_token` expires.
    pub expires_in: i64,
}

#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyPair {
    fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    fn sign(&self, user: &AuthUser, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = JwtClaims {
            sub: user.id,
            email: user.email.clone(),
            roles: user.roles.iter().copied().collect(),
            is_email_verified: user.is_email_verified,
            is_phone_number_verified: user.is_phone_number_verified,
            iat,
            exp: iat + self.ttl.num_seconds(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        // Time checks run against the injected `now`, not the system clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

/// HS256 codec for access (and optionally refresh) tokens.
#[derive(Clone)]
pub struct Hs256TokenCodec {
    access: KeyPair,
    refresh: Option<KeyPair>,
}

impl Hs256TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            access: KeyPair::new(secret.as_ref(), ttl),
            refresh: None,
        }
    }

    /// Also issue refresh tokens, signed with their own secret.
    pub fn with_refresh(mut self, secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        self.refresh = Some(KeyPair::new(secret.as_ref(), ttl));
        self
    }

    pub fn access_ttl(&self) -> Duration {
        self.access.ttl
    }

    pub fn issue(&self, user: &AuthUser, now: DateTime<Utc>) -> Result<AccessToken, TokenError> {
        let access_token = self.access.sign(user, now)?;
        let refresh_token = self.refresh.as_ref().map(|pair| pair.sign(user, now)).transpose()?;
        Ok(AccessToken {
            access_token,
            refresh_token,
            expires_in: self.access.ttl.num_seconds(),
        })
    }

    pub fn verify_refresh(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        self.refresh.as_ref().ok_or(TokenError::RefreshDisabled)?.verify(token, now)
    }
}

impl TokenVerifier for Hs256TokenCodec {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        self.access.verify(token, now)
    }
}

impl core::fmt::Debug for Hs256TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenCodec")
            .field("access_ttl", &self.access.ttl)
            .field("refresh", &self.refresh.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use basekit_core::UserId;

    use super::*;
    use crate::UserRole;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn user() -> AuthUser {
        AuthUser {
            id: UserId::new(),
            email: "ada@example.com".into(),
            roles: BTreeSet::from([UserRole::User, UserRole::Admin]),
            is_email_verified: true,
            is_phone_number_verified: false,
        }
    }

    #[test]
    fn issued_token_verifies_back_to_the_same_user() {
        let codec = Hs256TokenCodec::new(SECRET, Duration::days(7));
        let now = Utc::now();
        let user = user();

        let issued = codec.issue(&user, now).unwrap();
        assert_eq!(issued.expires_in, 7 * 24 * 60 * 60);
        assert_eq!(issued.refresh_token, None);

        let claims = codec.verify(&issued.access_token, now).unwrap();
        assert_eq!(AuthUser::from(claims), user);
    }

    #[test]
    fn expiry_is_checked_against_injected_now() {
        let codec = Hs256TokenCodec::new(SECRET, Duration::minutes(10));
        let now = Utc::now();
        let token = codec.issue(&user(), now).unwrap().access_token;

        let err = codec.verify(&token, now + Duration::minutes(11)).unwrap_err();
        assert_eq!(err, TokenError::Claims(TokenValidationError::Expired));
        assert_eq!(err.reason(), AuthReason::TokenExpired);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let now = Utc::now();
        let token = Hs256TokenCodec::new("another-secret-another-secret-xx", Duration::minutes(10))
            .issue(&user(), now)
            .unwrap()
            .access_token;

        let err = Hs256TokenCodec::new(SECRET, Duration::minutes(10)).verify(&token, now).unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);
        assert_eq!(err.reason(), AuthReason::TokenInvalid);
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = Hs256TokenCodec::new(SECRET, Duration::minutes(10));
        assert!(matches!(codec.verify("not-a-jwt", Utc::now()), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn refresh_tokens_use_their_own_secret() {
        let codec = Hs256TokenCodec::new(SECRET, Duration::minutes(10))
            .with_refresh("refresh-secret-refresh-secret-xx", Duration::days(30));
        let now = Utc::now();
        let issued = codec.issue(&user(), now).unwrap();
        let refresh = issued.refresh_token.unwrap();

        assert!(codec.verify_refresh(&refresh, now).is_ok());
        assert_eq!(codec.verify(&refresh, now).unwrap_err(), TokenError::InvalidSignature);
        assert_eq!(
            Hs256TokenCodec::new(SECRET, Duration::minutes(10)).verify_refresh(&refresh, now),
            Err(TokenError::RefreshDisabled)
        );
    }
}
