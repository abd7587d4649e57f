//! # Validation Module
//!
//! Business-rule checks run before the calculator is invoked.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI / config parsing                                         │
//! │  ├── Locale-aware number parsing (parse_amount)                        │
//! │  └── Option names (region, amount type, tax policy)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field validators: one rule, one ValidationError                   │
//! │  └── Request validators: run every field, collect ALL failures         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculator                                                   │
//! │  └── Clamps negatives to zero, never fails                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use margin_core::validation::validate_pricing_input;
//! use margin_core::{Discount, PricingInput};
//!
//! let bad = PricingInput::new(0.0)
//!     .with_discount(Discount::Percent(120.0))
//!     .with_unit_cost(-1.0);
//!
//! let errors = validate_pricing_input(&bad).unwrap_err();
//! assert_eq!(errors.len(), 3);
//! ```

use crate::error::{ValidationError, ValidationErrors};
use crate::sensitivity::SensitivityConfig;
use crate::types::{Discount, PricingInput, TaxSpec};

/// Result type for single-rule validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Ceiling of every percentage input.
pub const MAX_PERCENT: f64 = 100.0;

// =============================================================================
// Field Validators
// =============================================================================

/// Rejects NaN and infinities.
pub fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Value must be finite and strictly greater than zero.
///
/// ```rust
/// use margin_core::validation::validate_positive;
///
/// assert!(validate_positive("sale_price", 10.0).is_ok());
/// assert!(validate_positive("sale_price", 0.0).is_err());
/// ```
pub fn validate_positive(field: &str, value: f64) -> ValidationResult<()> {
    validate_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Value must be finite and zero or greater.
pub fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Percentage in `0..=100`.
pub fn validate_percent(field: &str, value: f64) -> ValidationResult<()> {
    validate_non_negative(field, value)?;
    if value > MAX_PERCENT {
        return Err(ValidationError::PercentOutOfRange {
            field: field.to_string(),
            max: MAX_PERCENT,
        });
    }
    Ok(())
}

pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    match discount {
        Discount::Percent(p) => validate_percent("discount", *p),
        Discount::Absolute(a) => validate_non_negative("discount", *a),
    }
}

pub fn validate_tax(tax: &TaxSpec) -> ValidationResult<()> {
    match tax {
        TaxSpec::Percent(p) => validate_percent("tax", *p),
        TaxSpec::Absolute(a) => validate_non_negative("tax", *a),
    }
}

// =============================================================================
// Request Validators
// =============================================================================

/// Checks every field of a calculation request.
///
/// ## Rules
/// - `sale_price` > 0
/// - `unit_cost` ≥ 0
/// - discount and tax: percent in `0..=100`, absolute ≥ 0
/// - `tax_override`, when present, ≥ 0
/// - both regional factors ≥ 0
/// - everything finite
///
/// Failures are collected: the error lists every broken rule, one entry
/// per field.
pub fn validate_pricing_input(input: &PricingInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check(validate_positive("sale_price", input.sale_price));
    errors.check(validate_discount(&input.discount));
    errors.check(validate_tax(&input.tax));
    if let Some(amount) = input.tax_override {
        errors.check(validate_non_negative("tax_override", amount));
    }
    let factors = &input.factors;
    errors.check(validate_non_negative("primary_factor", factors.primary));
    errors.check(validate_non_negative("other_factor", factors.other));
    errors.check(validate_non_negative("unit_cost", input.unit_cost));

    errors.into_result()
}

/// Checks the perturbation sets of the sensitivity grid.
///
/// Both sets must be non-empty; every step must be finite and every cost
/// multiplier strictly positive.
pub fn validate_sensitivity_config(config: &SensitivityConfig) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if config.discount_steps.is_empty() {
        errors.push(ValidationError::Empty {
            field: "discount_steps".to_string(),
        });
    }
    if let Some(step) = config.discount_steps.iter().find(|s| !s.is_finite()) {
        errors.check(validate_finite("discount_steps", *step));
    }

    if config.cost_multipliers.is_empty() {
        errors.push(ValidationError::Empty {
            field: "cost_multipliers".to_string(),
        });
    }
    let invalid_multiplier = |m: &&f64| !(**m > 0.0 && m.is_finite());
    if let Some(m) = config.cost_multipliers.iter().find(invalid_multiplier) {
        errors.check(validate_positive("cost_multipliers", *m));
    }

    errors.into_result()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RegionalFactors;

    fn valid_input() -> PricingInput {
        PricingInput::new(100.0)
            .with_discount(Discount::Percent(10.0))
            .with_tax(TaxSpec::Percent(5.0))
            .with_unit_cost(30.0)
    }

    fn fields(errors: &ValidationErrors) -> Vec<&str> {
        errors.iter().map(|e| e.field()).collect()
    }

    #[test]
    fn test_field_validators() {
        assert!(validate_positive("x", 0.01).is_ok());
        assert!(validate_positive("x", 0.0).is_err());
        assert!(validate_non_negative("x", 0.0).is_ok());
        assert!(validate_non_negative("x", -0.01).is_err());
        assert!(validate_percent("x", 100.0).is_ok());
        assert!(validate_percent("x", 100.01).is_err());
        assert!(matches!(
            validate_positive("x", f64::NAN),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(validate_pricing_input(&valid_input()).is_ok());

        let absolute = valid_input()
            .with_discount(Discount::Absolute(500.0))
            .with_tax(TaxSpec::Absolute(0.0))
            .with_unit_cost(0.0);
        assert!(validate_pricing_input(&absolute).is_ok());
    }

    #[test]
    fn test_zero_price_rejected() {
        let errors = validate_pricing_input(&PricingInput {
            sale_price: 0.0,
            ..valid_input()
        })
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.to_string(), "sale_price must be greater than zero");
    }

    #[test]
    fn test_all_failures_collected() {
        let input = PricingInput::new(-1.0)
            .with_discount(Discount::Percent(150.0))
            .with_tax(TaxSpec::Percent(101.0))
            .with_tax_override(Some(-2.0))
            .with_factors(RegionalFactors::new(-1.0, 0.5))
            .with_unit_cost(-5.0);

        let errors = validate_pricing_input(&input).unwrap_err();
        assert_eq!(
            fields(&errors),
            [
                "sale_price",
                "discount",
                "tax",
                "tax_override",
                "primary_factor",
                "unit_cost"
            ]
        );
    }

    #[test]
    fn test_percent_messages() {
        let input = valid_input().with_discount(Discount::Percent(120.0));
        let errors = validate_pricing_input(&input).unwrap_err();
        assert_eq!(errors.to_string(), "discount cannot exceed 100%");
    }

    #[test]
    fn test_sensitivity_config_rules() {
        assert!(validate_sensitivity_config(&SensitivityConfig::default()).is_ok());

        let empty = SensitivityConfig {
            discount_steps: vec![],
            cost_multipliers: vec![],
            ..SensitivityConfig::default()
        };
        let errors = validate_sensitivity_config(&empty).unwrap_err();
        assert_eq!(fields(&errors), ["discount_steps", "cost_multipliers"]);

        let bad_multiplier = SensitivityConfig {
            cost_multipliers: vec![1.0, 0.0],
            ..SensitivityConfig::default()
        };
        let errors = validate_sensitivity_config(&bad_multiplier).unwrap_err();
        assert!(matches!(
            errors.iter().next(),
            Some(ValidationError::MustBePositive { .. })
        ));
    }
}
