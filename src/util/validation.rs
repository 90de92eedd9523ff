//! Field validators for the welcome form.
//!
//! Each validator takes the raw input and returns `None` when the value is
//! acceptable, or the message to show under the field. Lengths count Unicode
//! scalar values, not bytes.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use std::sync::OnceLock;

use regex::Regex;

/// Minimum trimmed length for first and last names.
pub const MIN_NAME_LEN: usize = 2;
/// Minimum trimmed length for phone numbers. Only characters are counted.
pub const MIN_PHONE_LEN: usize = 10;
/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        // Constant pattern; failure here is a bug in this file.
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn validate_first_name(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Some("First name is required");
    }
    if char_len(value) < MIN_NAME_LEN {
        return Some("First name must be at least 2 characters");
    }
    None
}

pub fn validate_last_name(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Some("Last name is required");
    }
    if char_len(value) < MIN_NAME_LEN {
        return Some("Last name must be at least 2 characters");
    }
    None
}

/// Validate a phone number by length alone.
///
/// Digits are not checked, so `"call me maybe"` passes.
pub fn validate_phone(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Some("Phone number is required");
    }
    if char_len(value) < MIN_PHONE_LEN {
        return Some("Phone number must be at least 10 digits");
    }
    None
}

/// Validate an email address against `local@domain.tld`.
///
/// The value is trimmed and lowercased before matching; neither part may
/// contain whitespace or `@`, and the domain needs at least one dot.
pub fn validate_email(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Some("Email is required");
    }
    if !email_pattern().is_match(&value.to_lowercase()) {
        return Some("Enter a valid email address");
    }
    None
}

/// Validate a password. Whitespace counts toward the length.
pub fn validate_password(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("Password is required");
    }
    if char_len(value) < MIN_PASSWORD_LEN {
        return Some("Password must be at least 8 characters");
    }
    None
}
