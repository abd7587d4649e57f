//! # Application Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  Command Function                                                       │
//! │  AppResult<()>                                                          │
//! │       │                                                                 │
//! │       ├── ValidationErrors ──► AppError::Validation  ──► exit 2        │
//! │       ├── bad flag value   ──► AppError::Input       ──► exit 2        │
//! │       ├── TOML / env       ──► AppError::Config      ──► exit 3        │
//! │       ├── DataError        ──► AppError::Data        ──► exit 4        │
//! │       ├── io::Error        ──► AppError::Io          ──► exit 4        │
//! │       └── JSON / TOML out  ──► AppError::Serialization ► exit 1        │
//! │                                                                         │
//! │  main: print message(s) to stderr, return the exit code                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use margin_core::{CoreError, ValidationErrors};
use margin_data::DataError;
use thiserror::Error;

/// Errors surfaced to the user by the `margin` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Inputs failed business-rule validation; nothing was computed.
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    /// A flag value could not be read (amount, region, type, policy).
    #[error("Invalid input: {0}")]
    Input(String),

    /// Configuration file or environment override is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Validation(_) | AppError::Input(_) => 2,
            AppError::Config(_) => 3,
            AppError::Data(_) | AppError::Io(_) => 4,
            AppError::Serialization(_) => 1,
        }
    }

    /// Lines to print, one per failure.
    ///
    /// Validation errors expand to every collected message.
    pub fn messages(&self) -> Vec<String> {
        match self {
            AppError::Validation(errors) => errors.iter().map(|e| e.to_string()).collect(),
            other => vec![other.to_string()],
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => AppError::Validation(errors),
            other => AppError::Input(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Result type for CLI commands.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use margin_core::ValidationError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::Config("x".into()).exit_code(), 3);
        assert_eq!(AppError::Input("x".into()).exit_code(), 2);
        assert_eq!(
            AppError::Data(DataError::EmptySource("costs.csv".into())).exit_code(),
            4
        );
    }

    #[test]
    fn test_validation_expands_every_message() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::MustBePositive {
            field: "sale_price".into(),
        });
        errors.push(ValidationError::MustNotBeNegative {
            field: "unit_cost".into(),
        });

        let err: AppError = CoreError::Validation(errors).into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.messages(),
            vec![
                "sale_price must be greater than zero".to_string(),
                "unit_cost cannot be negative".to_string()
            ]
        );
    }

    #[test]
    fn test_bad_amount_is_input_error() {
        let err: AppError = margin_core::parse_amount("abc").unwrap_err().into();
        assert!(matches!(err, AppError::Input(_)));
    }
}
