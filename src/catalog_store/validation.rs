//! Validation errors for submitted catalog and liked-song forms.
//!
//! Every failing field produces one [`ValidationError`]; a submission collects
//! all of them into [`ValidationErrors`] so the form can be re-rendered with
//! each message next to its field.

use serde::Serialize;
use std::fmt;

/// A submitted form field: the name it is posted under and its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
}

impl FormField {
    pub const fn new(name: &'static str, label: &'static str) -> Self {
        FormField { name, label }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required { field: FormField },
    InvalidNumber { field: FormField, value: String },
    NegativeValue { field: FormField, value: i64 },
    ForeignKeyViolation { field: FormField, id: i64 },
    AlreadyLiked { field: FormField, song_id: i64 },
}

impl ValidationError {
    pub fn field(&self) -> FormField {
        match self {
            ValidationError::Required { field }
            | ValidationError::InvalidNumber { field, .. }
            | ValidationError::NegativeValue { field, .. }
            | ValidationError::ForeignKeyViolation { field, .. }
            | ValidationError::AlreadyLiked { field, .. } => *field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Required { field } => {
                write!(f, "The {} field is required.", field.label)
            }
            ValidationError::InvalidNumber { field, value } => {
                write!(f, "The value '{}' is not valid for {}.", value, field.label)
            }
            ValidationError::NegativeValue { field, .. } => {
                write!(f, "{} must be a positive number.", field.label)
            }
            ValidationError::ForeignKeyViolation { field, .. } => {
                write!(f, "{} does not exist.", field.label)
            }
            ValidationError::AlreadyLiked { .. } => {
                write!(f, "This song is already in your liked songs.")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validation failure as shown next to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(error: &ValidationError) -> Self {
        FieldError {
            field: error.field().name,
            message: error.to_string(),
        }
    }
}

/// All the failures of a single submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.0.iter().any(|e| e.field().name == name)
    }

    pub fn field_errors(&self) -> Vec<FieldError> {
        self.0.iter().map(FieldError::from).collect()
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join(" "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Trims a submitted text value, treating blank input as missing.
pub fn required_text(
    errors: &mut ValidationErrors,
    field: FormField,
    value: Option<&str>,
) -> Option<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Some(text.to_string()),
        _ => {
            errors.push(ValidationError::Required { field });
            None
        }
    }
}

/// Parses a required whole number in `0..=i32::MAX`.
pub fn required_non_negative(
    errors: &mut ValidationErrors,
    field: FormField,
    value: Option<&str>,
) -> Option<i64> {
    let text = match value.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => {
            errors.push(ValidationError::Required { field });
            return None;
        }
    };
    match text.parse::<i32>() {
        Ok(number) if number < 0 => {
            errors.push(ValidationError::NegativeValue {
                field,
                value: number as i64,
            });
            None
        }
        Ok(number) => Some(number as i64),
        Err(_) => {
            errors.push(ValidationError::InvalidNumber {
                field,
                value: text.to_string(),
            });
            None
        }
    }
}

/// Parses a required row id.
pub fn required_id(
    errors: &mut ValidationErrors,
    field: FormField,
    value: Option<&str>,
) -> Option<i64> {
    let text = match value.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => {
            errors.push(ValidationError::Required { field });
            return None;
        }
    };
    match text.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(ValidationError::InvalidNumber {
                field,
                value: text.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: FormField = FormField::new("Title", "Title");
    const RELEASE_YEAR: FormField = FormField::new("ReleaseYear", "Release Year");
    const ALBUM_ID: FormField = FormField::new("AlbumId", "Album Id");

    #[test]
    fn blank_text_is_required() {
        let mut errors = ValidationErrors::new();
        assert_eq!(required_text(&mut errors, TITLE, Some("   ")), None);
        assert_eq!(required_text(&mut errors, TITLE, None), None);
        assert_eq!(
            required_text(&mut errors, TITLE, Some("  Rock Album ")),
            Some("Rock Album".to_string())
        );
        assert_eq!(errors.errors().len(), 2);
        assert_eq!(
            errors.field_errors()[0],
            FieldError {
                field: "Title",
                message: "The Title field is required.".to_string()
            }
        );
    }

    #[test]
    fn numbers_must_be_non_negative_whole_numbers() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            required_non_negative(&mut errors, RELEASE_YEAR, Some("2021")),
            Some(2021)
        );
        assert_eq!(
            required_non_negative(&mut errors, RELEASE_YEAR, Some("0")),
            Some(0)
        );
        assert!(errors.is_empty());

        assert_eq!(
            required_non_negative(&mut errors, RELEASE_YEAR, Some("-1")),
            None
        );
        assert_eq!(
            required_non_negative(&mut errors, RELEASE_YEAR, Some("nineteen")),
            None
        );
        assert_eq!(
            required_non_negative(&mut errors, RELEASE_YEAR, Some("99999999999")),
            None
        );
        let messages: Vec<String> = errors.errors().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "Release Year must be a positive number.".to_string(),
                "The value 'nineteen' is not valid for Release Year.".to_string(),
                "The value '99999999999' is not valid for Release Year.".to_string(),
            ]
        );
    }

    #[test]
    fn foreign_key_violation_message() {
        let error = ValidationError::ForeignKeyViolation {
            field: ALBUM_ID,
            id: 42,
        };
        assert_eq!(error.to_string(), "Album Id does not exist.");
        assert_eq!(FieldError::from(&error).field, "AlbumId");
    }

    #[test]
    fn into_result_reports_collected_errors() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let errors: ValidationErrors = ValidationError::Required { field: TITLE }.into();
        let collected = errors.into_result().unwrap_err();
        assert!(collected.contains_field("Title"));
        assert!(!collected.contains_field("ReleaseYear"));
    }
}
