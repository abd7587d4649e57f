//! # Margin Calculator
//!
//! Maps one [`PricingInput`] to one [`PricingResult`]. Arithmetic only.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sale_price ──► discount ──► net_price ──► × regional factor            │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │                                         revenue_after_region            │
//! │                                                   │                     │
//! │                          tax (policy) ◄───────────┤                     │
//! │                               │                   │                     │
//! │                               ▼                   ▼                     │
//! │               gross_profit = revenue - tax - unit_cost                  │
//! │               gross_margin = profit / revenue × 100   (0 if revenue=0)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use margin_core::pricing::compute;
//! use margin_core::{Discount, PricingInput, TaxSpec};
//!
//! let input = PricingInput::new(100.0)
//!     .with_discount(Discount::Percent(10.0))
//!     .with_tax(TaxSpec::Percent(5.0))
//!     .with_unit_cost(30.0);
//!
//! let result = compute(&input);
//! assert_eq!(result.net_price, 90.0);
//! assert_eq!(result.tax_amount, 4.5);
//! assert_eq!(result.gross_profit, 55.5);
//! ```
//!
//! ## Clamping
//! Out-of-range inputs are a validation-layer concern. The calculator still
//! clamps negative price, cost, factor, discount and tax to zero so that it
//! is total over every finite input and never divides by zero.

use serde::{Deserialize, Serialize};

use crate::types::{PricingInput, PricingResult, TaxPolicy};

/// The margin calculator.
///
/// Holds nothing but the tax policy, so it is `Copy` and can be shared
/// freely between independent calculations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginCalculator {
    pub tax_policy: TaxPolicy,
}

impl MarginCalculator {
    pub fn new(tax_policy: TaxPolicy) -> Self {
        MarginCalculator { tax_policy }
    }

    /// Computes every derived figure for `input`.
    ///
    /// Pure and deterministic: identical inputs give bit-identical results.
    pub fn compute(&self, input: &PricingInput) -> PricingResult {
        let sale_price = input.sale_price.max(0.0);

        let discount_amount = input.discount.amount_on(sale_price);
        let net_price = (sale_price - discount_amount).max(0.0);

        let regional_factor = input.regional_factor().max(0.0);
        let revenue_after_region = net_price * regional_factor;

        let tax_amount = self.resolve_tax(input, revenue_after_region);
        let unit_cost = input.unit_cost.max(0.0);

        let gross_profit = revenue_after_region - tax_amount - unit_cost;
        let gross_margin_percent = if revenue_after_region > 0.0 {
            gross_profit / revenue_after_region * 100.0
        } else {
            0.0
        };

        PricingResult {
            discount_amount,
            net_price,
            regional_factor,
            revenue_after_region,
            tax_amount,
            unit_cost,
            gross_profit,
            gross_margin_percent,
        }
    }

    /// Tax amount for `revenue` under the active policy. Never negative.
    fn resolve_tax(&self, input: &PricingInput, revenue: f64) -> f64 {
        match (self.tax_policy, input.tax_override) {
            (TaxPolicy::AbsoluteOverridesPercent, Some(amount)) if amount > 0.0 => amount,
            _ => input.tax.amount_on(revenue),
        }
    }
}

/// Computes with the default (strict) tax policy.
pub fn compute(input: &PricingInput) -> PricingResult {
    MarginCalculator::default().compute(input)
}

// =============================================================================
// Unit Tests
// =============================================================================
