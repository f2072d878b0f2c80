//! Input validation for configuration values and the auth forms.
//!
//! Form validators return `Option<String>` (the message for the field, if
//! it fails) so callers can collect every failing field into one
//! [`ValidationError`] before anything is sent.

use crate::error::{CliError, ValidationError};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate that a URL is properly formatted
pub fn validate_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("URL cannot be empty".to_string()).into());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        ))
        .into());
    }

    Ok(())
}

pub fn validate_required(value: &str, label: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(format!("{} is required", label))
    } else {
        None
    }
}

pub fn validate_email(email: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() {
        return Some("Email is required".to_string());
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Some("Please enter a valid email address".to_string());
    };

    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains(char::is_whitespace);
    if local.is_empty() || local.contains(char::is_whitespace) || !domain_ok {
        return Some("Please enter a valid email address".to_string());
    }
    None
}

/// Digits with an optional leading `+`; separators (space, dash, parens)
/// are ignored. 7 to 15 digits.
pub fn validate_phone(phone: &str) -> Option<String> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Some("Phone number is required".to_string());
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let mut digits = 0usize;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' => {}
            _ => return Some("Please enter a valid phone number".to_string()),
        }
    }
    if !(7..=15).contains(&digits) {
        return Some("Please enter a valid phone number".to_string());
    }
    None
}

pub fn validate_password(password: &str, min_len: usize) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < min_len {
        return Some(format!(
            "Password must be at least {} characters",
            min_len
        ));
    }
    None
}

/// Accumulates field failures.
#[derive(Debug, Default)]
pub struct FormCheck {
    errors: ValidationError,
}

impl FormCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, failure: Option<String>) -> Self {
        if let Some(message) = failure {
            self.errors.insert(name, message);
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        self.errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_valid_urls() {
        assert!(validate_url("http://localhost:3000").is_ok());
        assert!(validate_url("https://qick-backend-staging.onrender.com/").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_invalid_urls() {
        assert!(validate_url("").is_err());
        assert!(validate_url("localhost:3000").is_err());
        assert!(validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_email_accepts_valid_emails() {
        assert_eq!(validate_email("user@example.com"), None);
        assert_eq!(validate_email("test.email@domain.org"), None);
        assert_eq!(validate_email("  padded@qick.app "), None);
    }

    #[test]
    fn test_validate_email_rejects_invalid_emails() {
        assert_eq!(validate_email(""), Some("Email is required".to_string()));
        assert!(validate_email("invalid").is_some());
        assert!(validate_email("@domain.com").is_some());
        assert!(validate_email("user@").is_some());
        assert!(validate_email("user@domain").is_some());
        assert!(validate_email("user@domain@com").is_some());
        assert!(validate_email("us er@domain.com").is_some());
        assert!(validate_email("user@.domain.com").is_some());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("+52 55 1234 5678"), None);
        assert_eq!(validate_phone("(555) 123-4567"), None);
        assert!(validate_phone("").is_some());
        assert!(validate_phone("12345").is_some());
        assert!(validate_phone("555-CALL-NOW").is_some());
        assert!(validate_phone("+1234567890123456").is_some());
    }

    #[test]
    fn test_validate_password() {
        assert_eq!(validate_password("secret", MIN_PASSWORD_LEN), None);
        assert!(validate_password("", 1).is_some());
        assert!(validate_password("abc", MIN_PASSWORD_LEN).is_some());
    }

    #[test]
    fn test_form_check_collects_failures() {
        let result = FormCheck::new()
            .field("email", validate_email("nope"))
            .field("password", validate_password("", 1))
            .field("firstName", validate_required("Ana", "First name"))
            .finish();
        let err = result.expect_err("form should fail");
        assert_eq!(err.fields.len(), 2);
        assert!(err.message_for("firstName").is_none());
    }
}
