use super::*;

// =============================================================
// names
// =============================================================

#[test]
fn first_name_required() {
    assert_eq!(validate_first_name(""), Some("First name is required"));
    assert_eq!(validate_first_name("   "), Some("First name is required"));
}

#[test]
fn first_name_too_short_after_trim() {
    assert_eq!(validate_first_name(" a "), Some("First name must be at least 2 characters"));
}

#[test]
fn first_name_accepts_two_chars() {
    assert_eq!(validate_first_name("Al"), None);
    assert_eq!(validate_first_name("  Jo  "), None);
}

#[test]
fn first_name_counts_chars_not_bytes() {
    assert_eq!(validate_first_name("É"), Some("First name must be at least 2 characters"));
    assert_eq!(validate_first_name("Éa"), None);
}

#[test]
fn last_name_mirrors_first_name_rules() {
    assert_eq!(validate_last_name(""), Some("Last name is required"));
    assert_eq!(validate_last_name("D"), Some("Last name must be at least 2 characters"));
    assert_eq!(validate_last_name("Doe"), None);
}

// =============================================================
// phone
// =============================================================

#[test]
fn phone_required() {
    assert_eq!(validate_phone("  "), Some("Phone number is required"));
}

#[test]
fn phone_needs_ten_chars() {
    assert_eq!(validate_phone("123456789"), Some("Phone number must be at least 10 digits"));
    assert_eq!(validate_phone("0334788231"), None);
}

#[test]
fn phone_only_counts_characters() {
    assert_eq!(validate_phone("call me maybe"), None);
}

// =============================================================
// email
// =============================================================

#[test]
fn email_required() {
    assert_eq!(validate_email(""), Some("Email is required"));
    assert_eq!(validate_email(" \t "), Some("Email is required"));
}

#[test]
fn email_accepts_plain_address() {
    assert_eq!(validate_email("john@example.com"), None);
    assert_eq!(validate_email("  John.Doe@Example.CO.uk "), None);
}

#[test]
fn email_rejects_malformed_addresses() {
    for bad in ["bad", "john@", "@example.com", "john@example", "jo hn@example.com", "a@b@c.com", "john@exa mple.com"] {
        assert_eq!(validate_email(bad), Some("Enter a valid email address"), "expected rejection for {bad:?}");
    }
}

#[test]
fn email_rejects_trailing_dot_domain() {
    assert_eq!(validate_email("john@example."), Some("Enter a valid email address"));
}

// =============================================================
// password
// =============================================================

#[test]
fn password_required() {
    assert_eq!(validate_password(""), Some("Password is required"));
}

#[test]
fn password_too_short() {
    assert_eq!(validate_password("short"), Some("Password must be at least 8 characters"));
}

#[test]
fn password_long_enough() {
    assert_eq!(validate_password("longenough1"), None);
    assert_eq!(validate_password("12345678"), None);
}

#[test]
fn password_is_not_trimmed() {
    assert_eq!(validate_password("        "), None);
}
