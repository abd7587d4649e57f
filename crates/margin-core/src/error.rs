//! # Error Types
//!
//! Domain-specific error types for margin-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  margin-core errors (this file)                                        │
//! │  ├── CoreError         - General domain errors                         │
//! │  ├── ValidationErrors  - Every failed rule of one request              │
//! │  └── ValidationError   - A single failed rule                          │
//! │                                                                         │
//! │  margin-data errors (separate crate)                                   │
//! │  └── DataError         - File / CSV failures                           │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError          - What the user sees (exit code + message)      │
//! │                                                                         │
//! │  Flow: ValidationError → ValidationErrors → CoreError → AppError       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending field in every validation message
//! 3. Validation is collected, not short-circuited: the caller sees every
//!    problem of a request at once

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// The calculator and the grid generator are total functions, so the only
/// failures here come from the layers around them: input validation and
/// parsing of user-entered amounts.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more inputs failed validation; nothing was computed.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A user-entered amount could not be read as a number.
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    /// A named option (region, amount type, tax policy) is not recognised.
    #[error("Unknown {field} '{input}', expected one of: {allowed:?}")]
    UnknownOption {
        field: &'static str,
        input: String,
        allowed: &'static [&'static str],
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single failed validation rule.
///
/// Messages are caller-facing and surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value must be strictly greater than zero.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} cannot be negative")]
    MustNotBeNegative { field: String },

    /// Percentage above its ceiling.
    #[error("{field} cannot exceed {max}%")]
    PercentOutOfRange { field: String, max: f64 },

    /// NaN or infinity.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// A list that needs at least one element is empty.
    #[error("{field} must not be empty")]
    Empty { field: String },
}

impl ValidationError {
    /// Name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MustBePositive { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::PercentOutOfRange { field, .. }
            | ValidationError::NotFinite { field }
            | ValidationError::Empty { field } => field,
        }
    }
}

// =============================================================================
// Collected Validation Errors
// =============================================================================

/// Every validation failure of one request.
///
/// ## Invariant
/// When returned inside `Err`, the list is never empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Creates an empty collector.
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    /// Records a failure.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Records the failure of a field-level check, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.0.push(e);
        }
    }

    /// Moves every failure of `other` into this collector.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing failed, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "sale_price".to_string(),
        };
        assert_eq!(err.to_string(), "sale_price must be greater than zero");

        let err = ValidationError::PercentOutOfRange {
            field: "discount".to_string(),
            max: 100.0,
        };
        assert_eq!(err.to_string(), "discount cannot exceed 100%");
    }

    #[test]
    fn test_collected_errors_display_all() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::MustBePositive {
            field: "sale_price".to_string(),
        });
        errors.push(ValidationError::MustNotBeNegative {
            field: "unit_cost".to_string(),
        });

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "sale_price must be greater than zero; unit_cost cannot be negative"
        );
    }

    #[test]
    fn test_empty_collector_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let errors: ValidationErrors = ValidationError::Empty {
            field: "cost_multipliers".to_string(),
        }
        .into();
        let core_err: CoreError = errors.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_field_accessor() {
        let err = ValidationError::NotFinite {
            field: "unit_cost".to_string(),
        };
        assert_eq!(err.field(), "unit_cost");
    }
}
