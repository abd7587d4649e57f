//! # margin-core: Pure Pricing & Margin Logic
//!
//! This crate is the engine of the margin calculator. It turns a price,
//! discount, tax rule, region and unit cost into margin figures, and
//! perturbs them into a sensitivity grid. Everything here is a pure
//! function with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Margin Calculator Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    margin (CLI binary)                          │   │
//! │  │    calc ──► cost ──► config        flags, TOML, env, tracing    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ margin-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │sensitivity│  │ validation│  │  analysis │  │   │
//! │  │   │ compute() │  │build_grid │  │ collected │  │ analyze() │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │   money   │  │ normalize │  │  proposal │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    margin-data (I/O Layer)                      │   │
//! │  │          cost catalog import, CSV export of grid and pivot      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (PricingInput, Discount, TaxSpec, Region, ...)
//! - [`pricing`] - The margin calculator
//! - [`sensitivity`] - Discount × cost sensitivity grid and pivot
//! - [`validation`] - Business rule validation, collected per request
//! - [`analysis`] - Cost resolution + validation + compute + grid in one call
//! - [`money`] - Currency formatting and locale-aware amount parsing
//! - [`normalize`] - Product-name lookup keys
//! - [`proposal`] - Copy-paste proposal text
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, bit-identical output
//! 2. **Total Engine**: the calculator clamps instead of failing; validation
//!    is a separate, explicit step
//! 3. **Sum Types**: percent vs absolute amounts are enum variants, never flags
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use margin_core::money::round_to;
//! use margin_core::{compute, Discount, PricingInput, TaxSpec};
//!
//! let input = PricingInput::new(100.0)
//!     .with_discount(Discount::Percent(10.0))
//!     .with_tax(TaxSpec::Percent(5.0))
//!     .with_unit_cost(30.0);
//!
//! let result = compute(&input);
//! assert_eq!(round_to(result.gross_margin_percent, 2), 61.67);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analysis;
pub mod error;
pub mod money;
pub mod normalize;
pub mod pricing;
pub mod proposal;
pub mod sensitivity;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use margin_core::MarginCalculator` instead of
// `use margin_core::pricing::MarginCalculator`

pub use analysis::{analyze, AnalysisWarning, CostResolution, MarginAnalysis};
pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use money::{parse_amount, CurrencyFormat};
pub use pricing::{compute, MarginCalculator};
pub use sensitivity::{build_grid, PivotTable, SensitivityConfig, SensitivityGrid, SensitivityRow};
pub use types::*;
