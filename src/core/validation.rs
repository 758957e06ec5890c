use crate::error::AppError;

pub const INPUT_TEXT_MIN_CHARS: usize = 20;
pub const INPUT_TEXT_MAX_CHARS: usize = 10_000;
pub const SUMMARY_TEXT_MIN_CHARS: usize = 10;

/// Bounds are enforced before any remote call so an invalid request never
/// spends a provider attempt.
pub fn validate_input_text(text: &str) -> Result<(), AppError> {
    let chars = text.chars().count();
    if chars < INPUT_TEXT_MIN_CHARS {
        return Err(AppError::Validation {
            field: "input_text",
            message: format!(
                "input_text must contain at least {INPUT_TEXT_MIN_CHARS} characters, got {chars}"
            ),
        });
    }
    if chars > INPUT_TEXT_MAX_CHARS {
        return Err(AppError::Validation {
            field: "input_text",
            message: format!(
                "input_text must contain at most {INPUT_TEXT_MAX_CHARS} characters, got {chars}"
            ),
        });
    }
    Ok(())
}

pub fn validate_summary_text(text: &str) -> Result<(), AppError> {
    let chars = text.chars().count();
    if chars < SUMMARY_TEXT_MIN_CHARS {
        return Err(AppError::Validation {
            field: "summary_text",
            message: format!(
                "summary_text must contain at least {SUMMARY_TEXT_MIN_CHARS} characters, got {chars}"
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_input_at_both_bounds() {
        assert!(validate_input_text(&"a".repeat(20)).is_ok());
        assert!(validate_input_text(&"a".repeat(10_000)).is_ok());
    }

    #[test]
    fn rejects_input_outside_bounds() {
        assert!(validate_input_text(&"a".repeat(19)).is_err());
        assert!(validate_input_text(&"a".repeat(10_001)).is_err());
        assert!(validate_input_text("").is_err());
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 20 multibyte characters are 60 bytes but still within bounds
        assert!(validate_input_text(&"日".repeat(20)).is_ok());
        assert!(validate_input_text(&"日".repeat(19)).is_err());
    }

    #[test]
    fn reports_the_offending_field() {
        let err = validate_summary_text("short").unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "summary_text"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn accepts_summary_at_minimum_length() {
        assert!(validate_summary_text(&"b".repeat(10)).is_ok());
        assert!(validate_summary_text(&"b".repeat(9)).is_err());
    }
}
