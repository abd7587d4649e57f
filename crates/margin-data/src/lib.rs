//! # margin-data: File I/O for the Margin Calculator
//!
//! Everything that touches a file lives here, so that `margin-core` stays
//! pure.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Margin Calculator Data Flow                      │
//! │                                                                         │
//! │  catalog.csv ──► ┌──────────────────────────────────────────────────┐  │
//! │                  │              margin-data (THIS CRATE)            │  │
//! │                  │                                                  │  │
//! │                  │   ┌────────────────┐        ┌────────────────┐   │  │
//! │                  │   │    catalog     │        │     export     │   │  │
//! │                  │   │  CostCatalog   │        │ write_raw_rows │   │  │
//! │                  │   │  CostSource    │        │  write_pivot   │   │  │
//! │                  │   │  CachedCatalog │        │                │   │  │
//! │                  │   └───────┬────────┘        └───────▲────────┘   │  │
//! │                  └───────────┼─────────────────────────┼────────────┘  │
//! │                              │ CostResolution          │ SensitivityGrid│
//! │                              ▼                         │                │
//! │                  ┌──────────────────────────────────────────────────┐  │
//! │                  │           margin-core::analyze()                 │  │
//! │                  └──────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`catalog`] - Cost catalog import and TTL-cached lookups
//! - [`export`] - Raw and pivot CSV writers
//! - [`error`] - Data error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod export;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{
    CachedCatalog, CatalogColumns, CatalogEntry, CostCatalog, CostSource, CsvFileSource,
};
pub use error::{DataError, DataResult};
pub use export::{write_pivot, write_pivot_file, write_raw_rows, write_raw_rows_file};
