//! Client-side input validation
//!
//! The list service performs no validation of its own for these columns, so
//! these checks are the only ones applied before a write.

use std::sync::LazyLock;

use regex::Regex;

/// `local@domain.tld`: no whitespace, exactly one `@`, a dot after it.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Message shown when any required field of the add form is blank
pub const MSG_REQUIRED_FIELDS: &str = "Please fill all required fields.";

/// Message shown when the email does not match the pattern
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address.";

/// Message shown when an inline edit leaves the department blank
pub const MSG_EMPTY_DEPARTMENT: &str = "Department cannot be empty.";

/// Message shown when a lookup is attempted with a blank identifier
pub const MSG_EMPTY_LOOKUP: &str = "Enter EmployeeID to lookup.";

/// Whether `value` looks like an email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Whether a required text field has a non-whitespace value.
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Validate the fields of the add form.
///
/// Returns the user-facing message on failure.
pub fn validate_new_employee(name: &str, department: &str, email: &str) -> Result<(), &'static str> {
    if !is_present(name) || !is_present(department) || !is_present(email) {
        return Err(MSG_REQUIRED_FIELDS);
    }
    if !is_valid_email(email) {
        return Err(MSG_INVALID_EMAIL);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user.example.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn required_fields_checked_before_email() {
        assert_eq!(validate_new_employee("", "HR", "bad"), Err(MSG_REQUIRED_FIELDS));
        assert_eq!(validate_new_employee("Ann", "  ", "a@b.com"), Err(MSG_REQUIRED_FIELDS));
        assert_eq!(validate_new_employee("Ann", "HR", ""), Err(MSG_REQUIRED_FIELDS));
        assert_eq!(validate_new_employee("Ann", "HR", "ann"), Err(MSG_INVALID_EMAIL));
        assert_eq!(validate_new_employee("Ann", "HR", "ann@corp.com"), Ok(()));
    }
}
