//! Message keys for access and user outcomes.

pub mod access {
    pub const PROFILE_FETCHED_SUCCESS: &str = "access.profile.fetched.success";
    pub const PROFILE_UPDATED_SUCCESS: &str = "access.profile.updated.success";
    pub const PROFILE_DELETED_SUCCESS: &str = "access.profile.deleted.success";
    pub const UNAUTHORIZED: &str = "access.unauthorized";
    pub const FORBIDDEN: &str = "access.forbidden";
}

pub mod user {
    pub const CREATED_SUCCESS: &str = "user.created.success";
    pub const UPDATED_SUCCESS: &str = "user.updated.success";
    pub const DELETED_SUCCESS: &str = "user.deleted.success";
    pub const FETCHED_SUCCESS: &str = "user.fetched.success";
    pub const FETCHED_ERROR: &str = "user.fetched.error";
    pub const NOT_FOUND: &str = "user.not.found";
    pub const ALREADY_EXISTS: &str = "user.already.exists";
    pub const EMAIL_ALREADY_EXISTS: &str = "user.email.already.exists";
    pub const PHONE_ALREADY_EXISTS: &str = "user.phone.already.exists";
}
