//! The auth decision: sequential gates that either allow (with the resolved
//! principal) or deny with a reason and an HTTP code.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{AuthReason, AuthUser, RouteAuth, TokenVerifier};

/// Outcome of a successful pass through the gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Public route; no principal was resolved.
    Anonymous,
    Authenticated(AuthUser),
}

impl Access {
    pub fn principal(&self) -> Option<&AuthUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    pub fn into_principal(self) -> Option<AuthUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DenialKind {
    AuthenticationRequired,
    EmailVerificationRequired,
    PrincipalMissing,
    AdminRequired,
}

impl DenialKind {
    pub fn http_code(self) -> u16 {
        match self {
            Self::AuthenticationRequired | Self::EmailVerificationRequired => 401,
            Self::PrincipalMissing | Self::AdminRequired => 403,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "Authentication required",
            Self::EmailVerificationRequired => "Email verification required",
            Self::PrincipalMissing => "User not found",
            Self::AdminRequired => "Admin access required",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", .kind.message())]
pub struct Denial {
    kind: DenialKind,
    reason: AuthReason,
}

impl Denial {
    pub fn new(kind: DenialKind, reason: AuthReason) -> Self {
        Self { kind, reason }
    }

    pub fn kind(&self) -> DenialKind {
        self.kind
    }

    pub fn reason(&self) -> AuthReason {
        self.reason
    }

    pub fn http_code(&self) -> u16 {
        self.kind.http_code()
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

/// Gate 1 (authentication) and gate 2 (email verification).
///
/// A public route is allowed before the credential is even looked at.
pub fn authenticate(
    route: RouteAuth,
    credential: Option<&str>,
    verifier: &dyn TokenVerifier,
    now: DateTime<Utc>,
) -> Result<Access, Denial> {
    if route.is_public {
        return Ok(Access::Anonymous);
    }

    let Some(token) = credential else {
        return Err(Denial::new(DenialKind::AuthenticationRequired, AuthReason::TokenInvalid));
    };

    let claims = verifier.verify(token, now).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        Denial::new(DenialKind::AuthenticationRequired, e.reason())
    })?;
    let user = AuthUser::from(claims);

    if !route.is_unverified && !user.is_email_verified {
        return Err(Denial::new(DenialKind::EmailVerificationRequired, AuthReason::EmailNotVerified));
    }

    Ok(Access::Authenticated(user))
}

/// Admin guard. Fails closed when no principal was resolved.
pub fn require_admin(principal: Option<&AuthUser>) -> Result<(), Denial> {
    let user = principal.ok_or(Denial::new(DenialKind::PrincipalMissing, AuthReason::InsufficientPermissions))?;
    if !user.is_admin() {
        return Err(Denial::new(DenialKind::AdminRequired, AuthReason::InsufficientPermissions));
    }
    Ok(())
}

/// Full decision for a route: the gates, then the admin guard when the route
/// asks for it.
pub fn authorize(
    route: RouteAuth,
    credential: Option<&str>,
    verifier: &dyn TokenVerifier,
    now: DateTime<Utc>,
) -> Result<Access, Denial> {
    let access = authenticate(route, credential, verifier, now)?;
    if route.requires_admin {
        require_admin(access.principal())?;
    }
    Ok(access)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use basekit_core::UserId;

    use super::*;
    use crate::{JwtClaims, TokenError, TokenValidationError, UserRole};

    /// Accepts `verified`, `unverified`, `admin` and `expired` as tokens.
    struct StubVerifier;

    impl TokenVerifier for StubVerifier {
        fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
            let mut claims = JwtClaims {
                sub: UserId::new(),
                email: "ada@example.com".into(),
                roles: vec![UserRole::User],
                is_email_verified: true,
                is_phone_number_verified: false,
                iat: now.timestamp(),
                exp: now.timestamp() + 60,
            };
            match token {
                "verified" => {}
                "unverified" => claims.is_email_verified = false,
                "admin" => claims.roles.push(UserRole::Admin),
                "expired" => return Err(TokenValidationError::Expired.into()),
                other => return Err(TokenError::Malformed(other.to_string())),
            }
            Ok(claims)
        }
    }

    fn decide(route: RouteAuth, credential: Option<&str>) -> Result<Access, Denial> {
        authorize(route, credential, &StubVerifier, Utc::now())
    }

    #[test]
    fn public_route_without_credential_is_allowed() {
        assert_eq!(decide(RouteAuth::PUBLIC, None), Ok(Access::Anonymous));
        // A broken credential is not even inspected.
        assert_eq!(decide(RouteAuth::PUBLIC, Some("garbage")), Ok(Access::Anonymous));
    }

    #[test]
    fn private_route_without_credential_is_denied_401() {
        let denial = decide(RouteAuth::PROTECTED, None).unwrap_err();
        assert_eq!(denial.kind(), DenialKind::AuthenticationRequired);
        assert_eq!(denial.http_code(), 401);
        assert_eq!(denial.to_string(), "Authentication required");
    }

    #[test]
    fn failed_verification_carries_token_reason() {
        let denial = decide(RouteAuth::PROTECTED, Some("expired")).unwrap_err();
        assert_eq!(denial.http_code(), 401);
        assert_eq!(denial.reason(), AuthReason::TokenExpired);

        let denial = decide(RouteAuth::PROTECTED, Some("garbage")).unwrap_err();
        assert_eq!(denial.reason(), AuthReason::TokenInvalid);
    }

    #[test]
    fn unverified_principal_is_denied_unless_route_allows_it() {
        let denial = decide(RouteAuth::PROTECTED, Some("unverified")).unwrap_err();
        assert_eq!(denial.kind(), DenialKind::EmailVerificationRequired);
        assert_eq!(denial.http_code(), 401);
        assert_eq!(denial.message(), "Email verification required");

        let access = decide(RouteAuth::UNVERIFIED, Some("unverified")).unwrap();
        assert!(!access.principal().unwrap().is_email_verified);
    }

    #[test]
    fn verified_principal_is_attached() {
        let access = decide(RouteAuth::PROTECTED, Some("verified")).unwrap();
        assert_eq!(access.principal().unwrap().email, "ada@example.com");
    }

    #[test]
    fn admin_guard_denies_non_admin_with_403() {
        let denial = decide(RouteAuth::ADMIN, Some("verified")).unwrap_err();
        assert_eq!(denial.kind(), DenialKind::AdminRequired);
        assert_eq!(denial.http_code(), 403);
        assert_eq!(denial.message(), "Admin access required");

        assert!(decide(RouteAuth::ADMIN, Some("admin")).unwrap().principal().unwrap().is_admin());
    }

    #[test]
    fn admin_guard_fails_closed_without_principal() {
        let denial = require_admin(None).unwrap_err();
        assert_eq!(denial.kind(), DenialKind::PrincipalMissing);
        assert_eq!(denial.http_code(), 403);

        let public_admin = RouteAuth {
            requires_admin: true,
            ..RouteAuth::PUBLIC
        };
        assert_eq!(decide(public_admin, None).unwrap_err().message(), "User not found");
    }

    #[test]
    fn admin_guard_denies_empty_role_set() {
        let user = AuthUser {
            id: UserId::new(),
            email: "ada@example.com".into(),
            roles: BTreeSet::new(),
            is_email_verified: true,
            is_phone_number_verified: true,
        };
        assert_eq!(require_admin(Some(&user)).unwrap_err().kind(), DenialKind::AdminRequired);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the decision matches the gate table for every
            /// route annotation and principal shape.
            #[test]
            fn decision_follows_gate_table(
                is_public in any::<bool>(),
                is_unverified in any::<bool>(),
                requires_admin in any::<bool>(),
                credential in prop::option::of(prop::sample::select(vec!["verified", "unverified", "admin", "expired"])),
            ) {
                let route = RouteAuth { is_public, is_unverified, requires_admin };
                let decision = decide(route, credential);

                let expected_code = if is_public {
                    requires_admin.then_some(403)
                } else {
                    match credential {
                        None | Some("expired") => Some(401),
                        Some("unverified") if !is_unverified => Some(401),
                        Some("admin") => None,
                        _ => requires_admin.then_some(403),
                    }
                };

                prop_assert_eq!(decision.as_ref().err().map(Denial::http_code), expected_code);
                if let Ok(access) = decision {
                    prop_assert_eq!(access.principal().is_none(), is_public);
                }
            }
        }
    }
}
