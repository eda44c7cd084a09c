//! Input validation for request DTOs.
//!
//! DTOs implement [`Validate`]; failures are collected per field (not
//! short-circuited) so clients see every problem at once.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Field name -> list of violated constraints.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Shape used in the `errors` field of an error envelope.
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(field, messages)| {
                let messages = messages.iter().cloned().map(Value::String).collect();
                (field.clone(), Value::Array(messages))
            })
            .collect()
    }

    // ── rule helpers ────────────────────────────────────────────────────────

    pub fn min_chars(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.add(field, format!("{field} must be longer than or equal to {min} characters"));
        }
    }

    pub fn not_blank(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{field} should not be empty"));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !is_email(value) {
            self.add(field, format!("{field} must be an email"));
        }
    }

    pub fn range(&mut self, field: &str, value: u64, min: u64, max: Option<u64>) {
        if value < min {
            self.add(field, format!("{field} must not be less than {min}"));
        }
        if let Some(max) = max.filter(|max| value > *max) {
            self.add(field, format!("{field} must not be greater than {max}"));
        }
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for message in self.0.values().flatten() {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by every inbound DTO.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Basic structural check: one `@`, non-empty local part, dotted domain,
/// no whitespace.
fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
