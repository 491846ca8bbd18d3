use std::collections::HashMap;

use crate::database::models::{fits_name_column, MAX_NAME_LENGTH};
use crate::error::ApiError;

/// Parses the `:id` path segment shared by the gym routes
pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::bad_request(format!("Invalid id given {}", raw)))
}

/// Treats a blank optional text field as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Validation error for a name that would not fit its column
pub fn check_name_length(field: &str, value: &str) -> Result<(), ApiError> {
    if fits_name_column(value) {
        return Ok(());
    }
    let mut field_errors = HashMap::new();
    field_errors.insert(
        field.to_string(),
        format!("Must be at most {} characters", MAX_NAME_LENGTH),
    );
    Err(ApiError::validation_error("Field too long", Some(field_errors)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = parse_id("abc").unwrap_err();
        assert_eq!(err.message(), "Invalid id given abc");
        assert!(parse_id("99999999999").is_err());
    }

    #[test]
    fn name_length_is_checked_in_characters() {
        assert!(check_name_length("name", &"a".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(check_name_length("name", &"ü".repeat(MAX_NAME_LENGTH)).is_ok());

        let err = check_name_length("name", &"a".repeat(MAX_NAME_LENGTH + 1)).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" hi ".to_string())), Some("hi".to_string()));
    }
}
