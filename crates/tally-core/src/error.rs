//! # Validation Errors
//!
//! Input validation failures, raised at the request boundary before any
//! business logic or I/O runs.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, offending value)
//! 3. Errors are enum variants, never String

use thiserror::Error;

/// Input validation errors.
///
/// These occur when a request doesn't meet structural requirements.
/// Raised before business logic runs, so a failed validation never touches
/// the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// A numeric field that must be at least 1 (quantities).
    #[error("{field} must be at least 1, got {value}")]
    NotPositive { field: String, value: i64 },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a NotPositive error for a field.
    pub fn not_positive(field: impl Into<String>, value: i64) -> Self {
        ValidationError::NotPositive {
            field: field.into(),
            value,
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::required("business_id");
        assert_eq!(err.to_string(), "business_id is required");

        let err = ValidationError::not_positive("quantity", 0);
        assert_eq!(err.to_string(), "quantity must be at least 1, got 0");
    }
}
