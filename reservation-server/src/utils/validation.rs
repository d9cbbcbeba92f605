//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SurrealDB TEXT fields have no built-in length enforcement, so limits
//! are applied at the API boundary.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Person names, table display names
pub const MAX_NAME_LEN: usize = 200;

/// Free-text reservation notes
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone numbers, floorplan/table ids
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum phone length
pub const MIN_PHONE_LEN: usize = 6;

/// Minimum first/last name length
pub const MIN_NAME_LEN: usize = 2;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a minimum length for a required string.
pub fn validate_min_len(value: &str, field: &str, min_len: usize) -> Result<(), AppError> {
    if value.trim().len() < min_len {
        return Err(AppError::validation(format!(
            "{field} must be at least {min_len} characters"
        )));
    }
    Ok(())
}

/// Minimal email shape check - one '@' with content on both sides.
pub fn validate_email(value: &str) -> Result<(), AppError> {
    validate_required_text(value, "email", MAX_EMAIL_LEN)?;
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::validation(format!("Invalid email address: {value}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Table 1", "tableName", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("  ", "tableName", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(300), "tableName", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(None, "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(Some("window seat"), "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(Some(&"x".repeat(600)), "note", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("guest@example.com").is_ok());
        assert!(validate_email("guest@localhost").is_err());
        assert!(validate_email("not-an-email").is_err());
    }
}
