//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a free-text field holds at least one non-whitespace character.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("Riverside court") // Ok
/// validate_not_blank("   ")             // Err - only whitespace
/// validate_not_blank("")                // Err - empty
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank_valid() {
        assert!(validate_not_blank("Riverside court").is_ok());
        assert!(validate_not_blank(" padded ").is_ok());
        assert!(validate_not_blank("x").is_ok());
    }

    #[test]
    fn test_validate_not_blank_invalid() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" ").is_err());
        assert!(validate_not_blank("\t\n").is_err());
    }
}
