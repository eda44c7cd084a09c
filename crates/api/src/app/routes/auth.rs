use axum::Extension;
use serde::Serialize;

use basekit_auth::AuthUser;
use basekit_auth::literals::access;
use basekit_responses::{Envelope, operation_completed};

use crate::app::extract::RequestPath;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStatus {
    pub is_email_verified: bool,
    pub is_phone_number_verified: bool,
}

/// Reachable before the email is verified.
pub async fn verification(
    Extension(user): Extension<AuthUser>,
    RequestPath(path): RequestPath,
) -> Envelope<VerificationStatus> {
    let status = VerificationStatus {
        is_email_verified: user.is_email_verified,
        is_phone_number_verified: user.is_phone_number_verified,
    };
    operation_completed(status, path)
}

pub async fn me(Extension(user): Extension<AuthUser>, RequestPath(path): RequestPath) -> Envelope<AuthUser> {
    Envelope::success(user, "Profile fetched successfully")
        .with_message_key(access::PROFILE_FETCHED_SUCCESS)
        .with_path(path)
}
