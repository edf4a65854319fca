//! Field rules shared by the lead and sample forms.
//!
//! The email rule is deliberately lenient: something, an `@`, something, a
//! dot, something, with no whitespace anywhere. It is not an RFC 5322 parser.

use std::sync::LazyLock;

use regex::Regex;
use shared::{
    domain::{FieldName, LeadFields, SampleFields},
    error::ValidationError,
};

pub const INVALID_NAME_MESSAGE: &str = "Please enter your name.";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const INVALID_PHONE_MESSAGE: &str = "Please enter a valid phone number (or leave it blank).";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9+\-\s().]{7,}$").expect("phone pattern is a valid regex")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value.trim())
}

/// Blank is valid: the phone field is optional.
pub fn is_valid_phone(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || PHONE_PATTERN.is_match(value)
}

pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Checks the lead form in page order (name, email, phone), so the first
/// entry is the field that should take focus.
pub fn validate_lead(fields: &LeadFields) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_present(&fields.name) {
        errors.push(ValidationError::new(FieldName::Name, INVALID_NAME_MESSAGE));
    }
    if !is_valid_email(&fields.email) {
        errors.push(ValidationError::new(FieldName::Email, INVALID_EMAIL_MESSAGE));
    }
    if !is_valid_phone(&fields.phone) {
        errors.push(ValidationError::new(FieldName::Phone, INVALID_PHONE_MESSAGE));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_sample(fields: &SampleFields) -> Result<(), ValidationError> {
    if is_valid_email(&fields.email) {
        Ok(())
    } else {
        Err(ValidationError::new(FieldName::Email, INVALID_EMAIL_MESSAGE))
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
