use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use basekit_core::UserId;

use crate::{JwtClaims, UserRole};

/// The authenticated identity resolved from a credential.
///
/// Attached to the request once the guard allows it; handlers read it from
/// there and never from the raw token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub roles: BTreeSet<UserRole>,
    pub is_email_verified: bool,
    pub is_phone_number_verified: bool,
}

impl AuthUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }
}

impl From<JwtClaims> for AuthUser {
    fn from(claims: JwtClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            roles: claims.roles.into_iter().collect(),
            is_email_verified: claims.is_email_verified,
            is_phone_number_verified: claims.is_phone_number_verified,
        }
    }
}
