//! # Domain Types
//!
//! Value objects flowing in and out of the margin engine.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PricingInput   │   │ MarginCalculator│   │  PricingResult  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sale_price     │──►│  tax_policy     │──►│  net_price      │       │
//! │  │  discount       │   │                 │   │  revenue        │       │
//! │  │  tax / override │   └─────────────────┘   │  tax_amount     │       │
//! │  │  region/factors │                         │  gross_profit   │       │
//! │  │  unit_cost      │                         │  gross_margin % │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Discount     │   │     TaxSpec     │   │     Region      │       │
//! │  │  Percent(p)     │   │  Percent(p)     │   │  Primary (1.0)  │       │
//! │  │  Absolute(a)    │   │  Absolute(a)    │   │  Other   (0.5)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Sum Types?
//! Upstream forms carry the amount type as a string flag ("%" or a currency
//! symbol). Encoding it as an enum variant makes "a currency value read as a
//! percent" unrepresentable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Amount Kind
// =============================================================================

/// Whether an amount is a percentage or a currency value.
///
/// Used where the type arrives separately from the value (CLI flags,
/// spreadsheet columns) and the tagged enum has to be assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AmountKind {
    #[default]
    Percent,
    Absolute,
}

impl AmountKind {
    /// Builds a discount of this kind.
    pub fn discount(self, value: f64) -> Discount {
        match self {
            AmountKind::Percent => Discount::Percent(value),
            AmountKind::Absolute => Discount::Absolute(value),
        }
    }

    /// Builds a tax rule of this kind.
    pub fn tax(self, value: f64) -> TaxSpec {
        match self {
            AmountKind::Percent => TaxSpec::Percent(value),
            AmountKind::Absolute => TaxSpec::Absolute(value),
        }
    }
}

impl fmt::Display for AmountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountKind::Percent => write!(f, "percent"),
            AmountKind::Absolute => write!(f, "absolute"),
        }
    }
}

impl FromStr for AmountKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" | "pct" | "%" => Ok(AmountKind::Percent),
            "absolute" | "abs" | "currency" | "$" | "r$" => Ok(AmountKind::Absolute),
            other => Err(CoreError::UnknownOption {
                field: "amount type",
                input: other.to_string(),
                allowed: &["percent", "absolute"],
            }),
        }
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Discount granted on the sale price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the sale price (0-100).
    Percent(f64),
    /// Currency amount.
    Absolute(f64),
}

impl Discount {
    /// Raw value as entered.
    pub fn value(&self) -> f64 {
        match *self {
            Discount::Percent(v) | Discount::Absolute(v) => v,
        }
    }

    pub fn kind(&self) -> AmountKind {
        match self {
            Discount::Percent(_) => AmountKind::Percent,
            Discount::Absolute(_) => AmountKind::Absolute,
        }
    }

    /// Same kind, different value.
    pub fn with_value(&self, value: f64) -> Discount {
        self.kind().discount(value)
    }

    /// Resolves the discount into currency units for `sale_price`.
    ///
    /// Never negative.
    pub fn amount_on(&self, sale_price: f64) -> f64 {
        let amount = match *self {
            Discount::Percent(p) => sale_price * p / 100.0,
            Discount::Absolute(a) => a,
        };
        amount.max(0.0)
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::Percent(0.0)
    }
}

// =============================================================================
// Tax
// =============================================================================

/// Tax charged on region-adjusted revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TaxSpec {
    /// Percentage of revenue after the regional factor (0-100).
    Percent(f64),
    /// Fixed currency amount.
    Absolute(f64),
}

impl TaxSpec {
    pub fn value(&self) -> f64 {
        match *self {
            TaxSpec::Percent(v) | TaxSpec::Absolute(v) => v,
        }
    }

    pub fn kind(&self) -> AmountKind {
        match self {
            TaxSpec::Percent(_) => AmountKind::Percent,
            TaxSpec::Absolute(_) => AmountKind::Absolute,
        }
    }

    /// Resolves the tax into currency units for `revenue`. Never negative.
    pub fn amount_on(&self, revenue: f64) -> f64 {
        let amount = match *self {
            TaxSpec::Percent(p) => revenue * p / 100.0,
            TaxSpec::Absolute(a) => a,
        };
        amount.max(0.0)
    }
}

impl Default for TaxSpec {
    fn default() -> Self {
        TaxSpec::Percent(0.0)
    }
}

/// How the tax amount is resolved.
///
/// ## Policies
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  STRICT (default)                                                      │
/// │  Only the tagged `tax` is evaluated. `tax_override` is ignored.        │
/// │                                                                         │
/// │  ABSOLUTE OVERRIDES PERCENT (legacy forms)                             │
/// │  tax_override > 0 ?  → use it as-is                                    │
/// │                  no  → evaluate the tagged `tax`                       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum TaxPolicy {
    #[default]
    Strict,
    AbsoluteOverridesPercent,
}

impl fmt::Display for TaxPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxPolicy::Strict => write!(f, "strict"),
            TaxPolicy::AbsoluteOverridesPercent => write!(f, "absolute-overrides-percent"),
        }
    }
}

impl FromStr for TaxPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" | "tagged" => Ok(TaxPolicy::Strict),
            "absolute-overrides-percent" | "absolute_overrides_percent" | "legacy" => {
                Ok(TaxPolicy::AbsoluteOverridesPercent)
            }
            other => Err(CoreError::UnknownOption {
                field: "tax policy",
                input: other.to_string(),
                allowed: &["strict", "absolute-overrides-percent"],
            }),
        }
    }
}

// =============================================================================
// Region
// =============================================================================

/// Sales region of the deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Inside the designated region.
    #[default]
    Primary,
    /// Anywhere else.
    Other,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Primary => write!(f, "primary"),
            Region::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Region {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "in" | "inside" | "yes" => Ok(Region::Primary),
            "other" | "out" | "outside" | "no" => Ok(Region::Other),
            other => Err(CoreError::UnknownOption {
                field: "region",
                input: other.to_string(),
                allowed: &["primary", "other"],
            }),
        }
    }
}

/// Revenue-recognition multipliers per region.
///
/// Defaults model a consignment/wholesale split: full revenue inside the
/// designated region, half elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegionalFactors {
    pub primary: f64,
    pub other: f64,
}

impl RegionalFactors {
    pub const DEFAULT_PRIMARY: f64 = 1.0;
    pub const DEFAULT_OTHER: f64 = 0.5;

    pub fn new(primary: f64, other: f64) -> Self {
        RegionalFactors { primary, other }
    }

    /// Factor applied for `region`.
    pub fn factor_for(&self, region: Region) -> f64 {
        match region {
            Region::Primary => self.primary,
            Region::Other => self.other,
        }
    }
}

impl Default for RegionalFactors {
    fn default() -> Self {
        RegionalFactors {
            primary: Self::DEFAULT_PRIMARY,
            other: Self::DEFAULT_OTHER,
        }
    }
}

// =============================================================================
// Pricing Input
// =============================================================================

/// Everything one margin calculation needs.
///
/// Immutable per calculation; the grid generator derives variants with the
/// `with_*` methods instead of mutating a shared value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingInput {
    /// List price before discount.
    pub sale_price: f64,

    pub discount: Discount,

    pub tax: TaxSpec,

    /// Legacy absolute tax field. Only read under
    /// [`TaxPolicy::AbsoluteOverridesPercent`].
    #[serde(default)]
    pub tax_override: Option<f64>,

    pub region: Region,

    #[serde(default)]
    pub factors: RegionalFactors,

    /// Cost of goods for one unit.
    pub unit_cost: f64,
}

impl PricingInput {
    /// Starts an input at `sale_price` with no discount, no tax, primary
    /// region, default factors and zero cost.
    pub fn new(sale_price: f64) -> Self {
        PricingInput {
            sale_price,
            ..PricingInput::default()
        }
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_tax(mut self, tax: TaxSpec) -> Self {
        self.tax = tax;
        self
    }

    pub fn with_tax_override(mut self, amount: Option<f64>) -> Self {
        self.tax_override = amount;
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_factors(mut self, factors: RegionalFactors) -> Self {
        self.factors = factors;
        self
    }

    pub fn with_unit_cost(mut self, unit_cost: f64) -> Self {
        self.unit_cost = unit_cost;
        self
    }

    /// Factor for the input's own region.
    #[inline]
    pub fn regional_factor(&self) -> f64 {
        self.factors.factor_for(self.region)
    }
}

impl Default for PricingInput {
    fn default() -> Self {
        PricingInput {
            sale_price: 0.0,
            discount: Discount::default(),
            tax: TaxSpec::default(),
            tax_override: None,
            region: Region::default(),
            factors: RegionalFactors::default(),
            unit_cost: 0.0,
        }
    }
}

// =============================================================================
// Pricing Result
// =============================================================================

/// Derived figures of one calculation. Recomputed every call, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingResult {
    pub discount_amount: f64,
    /// `max(sale_price - discount_amount, 0)`.
    pub net_price: f64,
    pub regional_factor: f64,
    /// `net_price × regional_factor`.
    pub revenue_after_region: f64,
    pub tax_amount: f64,
    pub unit_cost: f64,
    /// `revenue_after_region - tax_amount - unit_cost`.
    pub gross_profit: f64,
    /// Profit over revenue in percent; 0 when revenue is 0.
    pub gross_margin_percent: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================
