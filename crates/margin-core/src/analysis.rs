//! # Analysis Facade
//!
//! One entry point for a full calculation request: resolve the cost,
//! validate, compute the baseline and build the sensitivity grid.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CostResolution ──┬── Known(c)        → unit_cost = c                   │
//! │                   └── Unresolved{..}  → unit_cost = 0 + warning         │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  validate input + sensitivity config  (every failure collected)        │
//! │          │ Err → CoreError::Validation, nothing computed               │
//! │          ▼                                                              │
//! │  MarginCalculator::compute  ──►  baseline PricingResult                 │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  build_grid  ──►  SensitivityGrid                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationErrors};
use crate::pricing::MarginCalculator;
use crate::sensitivity::{build_grid, SensitivityConfig, SensitivityGrid};
use crate::types::{PricingInput, PricingResult};
use crate::validation::{validate_pricing_input, validate_sensitivity_config};

// =============================================================================
// Cost Resolution
// =============================================================================

/// Outcome of looking up a unit cost.
///
/// An unreachable or empty cost source is never turned into a plausible
/// number: it stays `Unresolved` and the request proceeds with cost 0 and
/// a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CostResolution {
    Known { cost: f64 },
    Unresolved { reason: String },
}

impl CostResolution {
    pub fn known(cost: f64) -> Self {
        CostResolution::Known { cost }
    }

    pub fn unresolved(reason: impl Into<String>) -> Self {
        CostResolution::Unresolved {
            reason: reason.into(),
        }
    }

    /// The cost, if resolved.
    pub fn cost(&self) -> Option<f64> {
        match self {
            CostResolution::Known { cost } => Some(*cost),
            CostResolution::Unresolved { .. } => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, CostResolution::Known { .. })
    }
}

// =============================================================================
// Analysis Output
// =============================================================================

/// Non-fatal conditions the caller must surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// No cost could be resolved; the figures assume a unit cost of 0.
    CostUnresolved { reason: String },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::CostUnresolved { reason } => {
                write!(f, "unit cost unresolved ({}), assuming 0", reason)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarginAnalysis {
    /// The input actually computed, with the resolved cost applied.
    pub input: PricingInput,
    pub result: PricingResult,
    pub grid: SensitivityGrid,
    pub warnings: Vec<AnalysisWarning>,
}

impl MarginAnalysis {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// Runs a full calculation request.
///
/// ## Errors
/// [`CoreError::Validation`](crate::error::CoreError::Validation) carrying
/// every failed rule of both the input and the sensitivity config.
///
/// ## Example
/// ```rust
/// use margin_core::analysis::{analyze, CostResolution};
/// use margin_core::{Discount, MarginCalculator, PricingInput, SensitivityConfig, TaxSpec};
///
/// let input = PricingInput::new(100.0)
///     .with_discount(Discount::Percent(10.0))
///     .with_tax(TaxSpec::Percent(5.0));
///
/// let analysis = analyze(
///     &MarginCalculator::default(),
///     &input,
///     CostResolution::known(30.0),
///     &SensitivityConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!(analysis.result.gross_profit, 55.5);
/// assert_eq!(analysis.grid.rows.len(), 25);
/// ```
pub fn analyze(
    calculator: &MarginCalculator,
    input: &PricingInput,
    cost: CostResolution,
    config: &SensitivityConfig,
) -> CoreResult<MarginAnalysis> {
    let mut warnings = Vec::new();

    let unit_cost = match cost {
        CostResolution::Known { cost } => cost,
        CostResolution::Unresolved { reason } => {
            warn!(%reason, "Unit cost unresolved, proceeding with 0");
            warnings.push(AnalysisWarning::CostUnresolved { reason });
            0.0
        }
    };
    let input = input.with_unit_cost(unit_cost);

    let mut errors = ValidationErrors::new();
    if let Err(e) = validate_pricing_input(&input) {
        errors.extend(e);
    }
    if let Err(e) = validate_sensitivity_config(config) {
        errors.extend(e);
    }
    errors.into_result()?;

    let result = calculator.compute(&input);
    let grid = build_grid(calculator, &input, config);

    debug!(
        policy = %calculator.tax_policy,
        margin = result.gross_margin_percent,
        warnings = warnings.len(),
        "Analysis complete"
    );

    Ok(MarginAnalysis {
        input,
        result,
        grid,
        warnings,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{Discount, TaxSpec};

    fn input() -> PricingInput {
        PricingInput::new(100.0)
            .with_discount(Discount::Percent(10.0))
            .with_tax(TaxSpec::Percent(5.0))
    }

    #[test]
    fn test_known_cost_is_applied() {
        let analysis = analyze(
            &MarginCalculator::default(),
            &input().with_unit_cost(999.0),
            CostResolution::known(30.0),
            &SensitivityConfig::default(),
        )
        .unwrap();

        assert_eq!(analysis.input.unit_cost, 30.0);
        assert_eq!(analysis.result.unit_cost, 30.0);
        assert!(!analysis.has_warnings());
    }

    #[test]
    fn test_unresolved_cost_proceeds_with_zero_and_warns() {
        let analysis = analyze(
            &MarginCalculator::default(),
            &input(),
            CostResolution::unresolved("product not in catalog"),
            &SensitivityConfig::default(),
        )
        .unwrap();

        assert_eq!(analysis.result.unit_cost, 0.0);
        assert_eq!(
            analysis.warnings,
            vec![AnalysisWarning::CostUnresolved {
                reason: "product not in catalog".to_string()
            }]
        );
        assert!(analysis.warnings[0].to_string().contains("assuming 0"));
    }

    #[test]
    fn test_validation_blocks_computation_and_collects_everything() {
        let config = SensitivityConfig {
            cost_multipliers: vec![],
            ..SensitivityConfig::default()
        };
        let input = PricingInput::new(0.0)
            .with_discount(Discount::Percent(120.0));
        let err = analyze(
            &MarginCalculator::default(),
            &input,
            CostResolution::known(-1.0),
            &config,
        )
        .unwrap_err();

        match err {
            CoreError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
                assert_eq!(
                    fields,
                    ["sale_price", "discount", "unit_cost", "cost_multipliers"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cost_resolution_serializes_tagged() {
        let json = serde_json::to_string(&CostResolution::known(12.5)).unwrap();
        assert_eq!(json, r#"{"status":"known","cost":12.5}"#);
    }
}
