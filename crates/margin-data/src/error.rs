//! # Data Error Types
//!
//! Error types for file and CSV operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / csv::Error                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DataError (this module) ← Adds column / line context                  │
//! │       │                                                                 │
//! │       ├──► CachedCatalog: degrades to CostResolution::Unresolved       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in CLI) ← Exit code + message                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// File and CSV operation errors.
#[derive(Debug, Error)]
pub enum DataError {
    /// File could not be opened, created or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV or a record that failed to serialize.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is not in the header row.
    ///
    /// ## When This Occurs
    /// - The catalog export renamed its columns
    /// - `catalog.product_column` / `catalog.cost_column` misconfigured
    #[error("Missing column '{column}' (found: {})", available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// A cost cell that is not a non-negative amount.
    #[error("Invalid cost on line {line}: {reason}")]
    InvalidCost { line: u64, reason: String },

    /// The source loaded but produced no usable rows.
    #[error("Cost source '{0}' has no usable rows")]
    EmptySource(String),

    /// No catalog file configured or the file does not exist.
    #[error("Cost catalog not found: {}", .0.display())]
    NotFound(PathBuf),
}

impl DataError {
    pub fn missing_column(column: impl Into<String>, available: &csv::StringRecord) -> Self {
        DataError::MissingColumn {
            column: column.into(),
            available: available.iter().map(str::to_string).collect(),
        }
    }
}

/// Result type for data operations.
pub type DataResult<T> = Result<T, DataError>;
