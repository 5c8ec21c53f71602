//! Field-level validation helpers shared by every module.
//!
//! Lengths are counted in Unicode scalar values, not bytes, since most
//! content is Korean or Japanese.

use crate::error::CoreError;
use crate::types::Date;

/// Validate a required text field: non-blank and at most `max` chars.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    validate_max_len(field, value, max)
}

/// Validate an optional text field: at most `max` chars when present.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<(), CoreError> {
    match value {
        Some(v) => validate_max_len(field, v, max),
        None => Ok(()),
    }
}

/// Validate that `value` is at most `max` chars.
pub fn validate_max_len(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Validate that a date is not after `today`.
pub fn validate_not_future(field: &str, date: Option<Date>, today: Date) -> Result<(), CoreError> {
    if let Some(d) = date {
        if d > today {
            return Err(CoreError::Validation(format!(
                "{field} must not be in the future"
            )));
        }
    }
    Ok(())
}

/// Validate a value against a fixed set of accepted strings.
pub fn validate_one_of(field: &str, value: &str, valid: &[&str]) -> Result<(), CoreError> {
    if valid.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {field} '{value}'. Must be one of: {}",
            valid.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn required_text_rejects_blank() {
        assert!(validate_required_text("Name", "", 10).is_err());
        assert!(validate_required_text("Name", "   ", 10).is_err());
        assert!(validate_required_text("Name", "TWICE", 10).is_ok());
    }

    #[test]
    fn max_len_counts_chars_not_bytes() {
        // 4 Hangul syllables are 12 bytes but only 4 chars.
        assert!(validate_max_len("Name", "방탄소년", 4).is_ok());
        assert!(validate_max_len("Name", "방탄소년단", 4).is_err());
    }

    #[test]
    fn optional_text_none_is_ok() {
        assert!(validate_optional_text("CEO", None, 1).is_ok());
        assert!(validate_optional_text("CEO", Some("ab"), 1).is_err());
    }

    #[test]
    fn future_dates_rejected() {
        let today = date(2024, 5, 1);
        assert!(validate_not_future("Birthday", Some(date(2024, 5, 1)), today).is_ok());
        assert!(validate_not_future("Birthday", Some(date(2024, 5, 2)), today).is_err());
        assert!(validate_not_future("Birthday", None, today).is_ok());
    }

    #[test]
    fn one_of_lists_valid_values() {
        let err = validate_one_of("category", "spam", &["news", "event"]).unwrap_err();
        assert!(err.to_string().contains("news, event"));
    }
}
