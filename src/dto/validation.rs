//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates a display name that has already been trimmed.
///
/// # Examples
///
/// ```ignore
/// validate_display_name("Alice", 32)  // Ok
/// validate_display_name("", 32)       // Err - empty
/// validate_display_name("a\u{7}", 32) // Err - control character
/// ```
pub fn validate_display_name(name: &str, max_len: usize) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be empty or whitespace".into());
        return Err(err);
    }

    let len = name.chars().count();
    if len > max_len {
        let mut err = ValidationError::new("name_length");
        err.message =
            Some(format!("Name must be at most {max_len} characters (got {len})").into());
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("name_format");
        err.message = Some("Name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
