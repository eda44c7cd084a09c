//! Inbound request bodies for the auth and user surfaces.
//!
//! Exported for services built on the gateway; its own routes take no bodies.
//! Unknown properties are rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use basekit_core::{Validate, ValidationErrors};
use basekit_responses::{FilterQuery, SortOrder};

use crate::UserRole;

const MIN_NAME_CHARS: usize = 2;
const MIN_PASSWORD_CHARS: usize = 8;

/// E.164-ish: optional `+`, no leading zero, 2 to 15 digits.
static PHONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap_or_else(|e| unreachable!("phone pattern: {e}"))
});

fn phone_number(errors: &mut ValidationErrors, field: &str, value: &str) {
    if !PHONE_NUMBER.is_match(value) {
        errors.add(field, format!("{field} must be a valid phone number"));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    #[serde(default)]
    pub locale: Option<String>,
}

impl Validate for SignUpRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_chars("firstName", &self.first_name, MIN_NAME_CHARS);
        errors.min_chars("lastName", &self.last_name, MIN_NAME_CHARS);
        errors.email("email", &self.email);
        phone_number(&mut errors, "phoneNumber", &self.phone_number);
        errors.min_chars("password", &self.password, MIN_PASSWORD_CHARS);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyEmailRequest {
    pub code: String,
}

impl Validate for VerifyEmailRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank("code", &self.code);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub code: String,
    pub password: String,
}

impl Validate for ResetPasswordRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.not_blank("code", &self.code);
        errors.min_chars("password", &self.password, MIN_PASSWORD_CHARS);
        errors.into_result()
    }
}

/// Admin-side user creation. Password is optional (invite flow).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserCreateRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<UserRole>>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl Validate for UserCreateRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_chars("firstName", &self.first_name, MIN_NAME_CHARS);
        errors.min_chars("lastName", &self.last_name, MIN_NAME_CHARS);
        errors.email("email", &self.email);
        if let Some(password) = &self.password {
            errors.min_chars("password", password, MIN_PASSWORD_CHARS);
        }
        errors.into_result()
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct UserUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<UserRole>>,
    pub locale: Option<String>,
    pub is_email_verified: Option<bool>,
    pub is_phone_number_verified: Option<bool>,
}

impl Validate for UserUpdateRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(first_name) = &self.first_name {
            errors.min_chars("firstName", first_name, MIN_NAME_CHARS);
        }
        if let Some(last_name) = &self.last_name {
            errors.min_chars("lastName", last_name, MIN_NAME_CHARS);
        }
        if let Some(email) = &self.email {
            errors.email("email", email);
        }
        if let Some(password) = &self.password {
            errors.min_chars("password", password, MIN_PASSWORD_CHARS);
        }
        errors.into_result()
    }
}

/// User listing query: the common list filter plus user-specific criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct UserFilter {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub email: Option<String>,
    pub roles: Option<Vec<UserRole>>,
    pub is_email_verified: Option<bool>,
    pub is_phone_number_verified: Option<bool>,
    pub is_deleted: Option<bool>,
}

impl UserFilter {
    /// The pagination/sort part of this filter.
    pub fn list_query(&self) -> FilterQuery {
        FilterQuery {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order,
        }
    }
}

impl Validate for UserFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.list_query().validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Some(email) = &self.email {
            errors.email("email", email);
        }
        errors.into_result()
    }
}
