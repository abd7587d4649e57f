//! # Sensitivity Grid Generator
//!
//! Shows how gross margin moves when discount and unit cost drift away from
//! a baseline deal.
//!
//! ## Grid Construction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  baseline discount d, steps {-5,-2,0,+2,+5}                             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  effective = max(d + step × scale, 0)    scale = 1 for Percent,         │
//! │        │                                         price/100 for Absolute │
//! │        ▼                                                                │
//! │  sort + dedup  (several steps may clamp to the same 0)                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  for each effective discount × each cost multiplier {0.90 … 1.10}      │
//! │        └──► MarginCalculator::compute(...)  ──► SensitivityRow          │
//! │                                                    │                    │
//! │                                                    ▼                    │
//! │  PivotTable: rows = discount labels (numeric order)                    │
//! │              cols = cost labels "-10%" "-5%" "0%" "+5%" "+10%"          │
//! │              cell = gross margin %, rounded to 2 places                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The flat rows keep full precision for the raw dataset; only the pivot
//! cells are rounded.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::money::{format_trimmed, round_to, CurrencyFormat};
use crate::pricing::MarginCalculator;
use crate::types::{AmountKind, Discount, PricingInput, PricingResult};

/// Default discount offsets (percentage points).
pub const DEFAULT_DISCOUNT_STEPS: [f64; 5] = [-5.0, -2.0, 0.0, 2.0, 5.0];

/// Default unit-cost multipliers.
pub const DEFAULT_COST_MULTIPLIERS: [f64; 5] = [0.90, 0.95, 1.00, 1.05, 1.10];

/// Decimal places of pivot cells.
pub const PIVOT_DECIMALS: i32 = 2;

// =============================================================================
// Configuration
// =============================================================================

/// Perturbations applied around the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SensitivityConfig {
    /// Offsets in percentage points. For an absolute discount each point is
    /// one percent of the sale price.
    pub discount_steps: Vec<f64>,

    /// Multipliers applied to the baseline unit cost.
    pub cost_multipliers: Vec<f64>,

    /// Used to label absolute discounts.
    #[serde(default)]
    pub currency: CurrencyFormat,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        SensitivityConfig {
            discount_steps: DEFAULT_DISCOUNT_STEPS.to_vec(),
            cost_multipliers: DEFAULT_COST_MULTIPLIERS.to_vec(),
            currency: CurrencyFormat::default(),
        }
    }
}

// =============================================================================
// Output Types
// =============================================================================

/// One (discount variant, cost variant) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SensitivityRow {
    /// Effective discount (percent or currency, same kind as the baseline).
    pub discount_value: f64,
    pub cost_multiplier: f64,
    pub discount_label: String,
    pub cost_label: String,
    pub result: PricingResult,
}

/// Margin matrix: discount labels down, cost labels across.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PivotTable {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// `cells[row][column]`, gross margin percent rounded to 2 places.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    pub fn row_count(&self) -> usize {
        self.row_labels.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_labels.len()
    }

    /// Cell at (`row_label`, `column_label`), if both exist.
    pub fn get(&self, row_label: &str, column_label: &str) -> Option<f64> {
        let row = self.row_labels.iter().position(|l| l == row_label)?;
        let col = self.column_labels.iter().position(|l| l == column_label)?;
        self.cells.get(row)?.get(col).copied().flatten()
    }
}

/// Everything the sensitivity view needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SensitivityGrid {
    /// One row per unique effective discount × cost multiplier.
    pub rows: Vec<SensitivityRow>,
    pub pivot: PivotTable,
    /// Rows that landed on an already-filled (discount label, cost label)
    /// cell and replaced it.
    pub collapsed_pairs: usize,
}

// =============================================================================
// Grid Builder
// =============================================================================

/// Builds the sensitivity grid around `baseline`.
///
/// Total: a zero-revenue baseline yields a grid full of zero margins.
pub fn build_grid(
    calculator: &MarginCalculator,
    baseline: &PricingInput,
    config: &SensitivityConfig,
) -> SensitivityGrid {
    let steps = &config.discount_steps;
    let discounts = effective_discounts(&baseline.discount, baseline.sale_price, steps);
    let kind = baseline.discount.kind();

    let mut rows = Vec::with_capacity(discounts.len() * config.cost_multipliers.len());
    for &discount_value in &discounts {
        let discount_label = discount_label(kind, discount_value, &config.currency);
        for &multiplier in &config.cost_multipliers {
            let variant = baseline
                .with_discount(baseline.discount.with_value(discount_value))
                .with_unit_cost(baseline.unit_cost * multiplier);

            rows.push(SensitivityRow {
                discount_value,
                cost_multiplier: multiplier,
                discount_label: discount_label.clone(),
                cost_label: cost_label(multiplier),
                result: calculator.compute(&variant),
            });
        }
    }

    let (pivot, collapsed_pairs) = pivot_rows(&rows);

    debug!(
        unique_discounts = discounts.len(),
        multipliers = config.cost_multipliers.len(),
        rows = rows.len(),
        pivot_rows = pivot.row_count(),
        pivot_columns = pivot.column_count(),
        "Sensitivity grid built"
    );

    SensitivityGrid {
        rows,
        pivot,
        collapsed_pairs,
    }
}

/// Unique effective discount values, ascending.
///
/// Offsets are percentage points; for an absolute discount they are scaled
/// to currency as `step × sale_price / 100`. Values clamp at zero, which is
/// where distinct offsets collapse.
pub fn effective_discounts(baseline: &Discount, sale_price: f64, steps: &[f64]) -> Vec<f64> {
    let scale = match baseline.kind() {
        AmountKind::Percent => 1.0,
        AmountKind::Absolute => sale_price / 100.0,
    };

    let mut values: Vec<f64> = steps
        .iter()
        .map(|step| clamp_non_negative(baseline.value() + step * scale))
        .collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// `v` when positive, otherwise exactly `+0.0`.
#[inline]
fn clamp_non_negative(v: f64) -> f64 {
    if v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Collapses rows into the pivot, last row winning on a repeated cell.
fn pivot_rows(rows: &[SensitivityRow]) -> (PivotTable, usize) {
    let mut row_keys: Vec<(f64, &str)> = Vec::new();
    let mut column_labels: Vec<String> = Vec::new();
    let mut cells: HashMap<(&str, &str), f64> = HashMap::with_capacity(rows.len());
    let mut collapsed = 0;

    for row in rows {
        match row_keys.iter_mut().find(|(_, l)| *l == row.discount_label) {
            Some(entry) => entry.0 = entry.0.min(row.discount_value),
            None => row_keys.push((row.discount_value, &row.discount_label)),
        }
        if !column_labels.contains(&row.cost_label) {
            column_labels.push(row.cost_label.clone());
        }

        let margin = round_to(row.result.gross_margin_percent, PIVOT_DECIMALS);
        if cells
            .insert((&row.discount_label, &row.cost_label), margin)
            .is_some()
        {
            collapsed += 1;
        }
    }

    if collapsed > 0 {
        warn!(
            collapsed,
            "Sensitivity rows collapsed onto existing pivot cells"
        );
    }

    row_keys.sort_by(|a, b| a.0.total_cmp(&b.0));
    sort_percent_labels(&mut column_labels);

    let row_labels: Vec<String> = row_keys.iter().map(|(_, l)| l.to_string()).collect();
    let matrix = row_labels
        .iter()
        .map(|r| {
            column_labels
                .iter()
                .map(|c| cells.get(&(r.as_str(), c.as_str())).copied())
                .collect()
        })
        .collect();

    (
        PivotTable {
            row_labels,
            column_labels,
            cells: matrix,
        },
        collapsed,
    )
}

// =============================================================================
// Labels
// =============================================================================

/// Display label of an effective discount.
///
/// Percent discounts print up to two decimals (`"10%"`, `"2.5%"`) so that
/// distinct values keep distinct labels; absolute discounts use the
/// currency format.
pub fn discount_label(kind: AmountKind, value: f64, currency: &CurrencyFormat) -> String {
    match kind {
        AmountKind::Percent => format!("{}%", format_trimmed(value, 2)),
        AmountKind::Absolute => currency.format(value),
    }
}

/// Signed whole-percent label of a cost multiplier relative to baseline.
///
/// ```rust
/// use margin_core::sensitivity::cost_label;
///
/// assert_eq!(cost_label(0.90), "-10%");
/// assert_eq!(cost_label(1.00), "0%");
/// assert_eq!(cost_label(1.05), "+5%");
/// ```
pub fn cost_label(multiplier: f64) -> String {
    let percent = ((multiplier - 1.0) * 100.0).round() as i64;
    match percent.cmp(&0) {
        Ordering::Greater => format!("+{}%", percent),
        Ordering::Equal => "0%".to_string(),
        Ordering::Less => format!("{}%", percent),
    }
}

/// Reads the signed number out of a percent label (`"+10%"`, `"-5%"`,
/// `"−5%"`, `"2.5%"`).
pub fn parse_percent_label(label: &str) -> Option<f64> {
    let body = label.trim();
    let body = body.strip_suffix('%').unwrap_or(body).trim();
    body.replace('\u{2212}', "-").parse::<f64>().ok()
}

/// Sorts percent labels by their signed numeric value, not as strings.
///
/// Labels that do not parse go last, in string order.
///
/// ```rust
/// use margin_core::sensitivity::sort_percent_labels;
///
/// let mut labels = vec!["+10%".to_string(), "-5%".into(), "0%".into(), "+2%".into()];
/// sort_percent_labels(&mut labels);
/// assert_eq!(labels, ["-5%", "0%", "+2%", "+10%"]);
/// ```
pub fn sort_percent_labels(labels: &mut [String]) {
    labels.sort_by(|a, b| match (parse_percent_label(a), parse_percent_label(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    });
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Region, TaxSpec};

    fn baseline() -> PricingInput {
        PricingInput::new(100.0)
            .with_discount(Discount::Percent(10.0))
            .with_tax(TaxSpec::Percent(5.0))
            .with_unit_cost(30.0)
    }

    fn default_grid(input: &PricingInput) -> SensitivityGrid {
        let config = SensitivityConfig::default();
        build_grid(&MarginCalculator::default(), input, &config)
    }

    #[test]
    fn test_effective_discounts_percent() {
        let values = effective_discounts(&Discount::Percent(10.0), 100.0, &DEFAULT_DISCOUNT_STEPS);
        assert_eq!(values, vec![5.0, 8.0, 10.0, 12.0, 15.0]);
    }

    #[test]
    fn test_effective_discounts_dedup_at_zero() {
        let values = effective_discounts(&Discount::Percent(0.0), 100.0, &DEFAULT_DISCOUNT_STEPS);
        assert_eq!(values, vec![0.0, 2.0, 5.0]);

        let values = effective_discounts(&Discount::Percent(3.0), 100.0, &DEFAULT_DISCOUNT_STEPS);
        assert_eq!(values, vec![0.0, 1.0, 3.0, 5.0, 8.0]);
    }

    #[test]
    fn test_effective_discounts_absolute_scale_by_price() {
        // one point = 1% of 200 = 2.00
        let values = effective_discounts(&Discount::Absolute(4.0), 200.0, &DEFAULT_DISCOUNT_STEPS);
        assert_eq!(values, vec![0.0, 4.0, 8.0, 14.0]);
    }

    #[test]
    fn test_cost_labels() {
        let labels: Vec<String> = DEFAULT_COST_MULTIPLIERS
            .iter()
            .map(|m| cost_label(*m))
            .collect();
        assert_eq!(labels, ["-10%", "-5%", "0%", "+5%", "+10%"]);
    }

    #[test]
    fn test_discount_labels() {
        let brl = CurrencyFormat::default();
        assert_eq!(discount_label(AmountKind::Percent, 10.0, &brl), "10%");
        assert_eq!(discount_label(AmountKind::Percent, 2.5, &brl), "2.5%");
        assert_eq!(discount_label(AmountKind::Absolute, 14.0, &brl), "R$ 14,00");
    }

    #[test]
    fn test_parse_percent_label() {
        assert_eq!(parse_percent_label("+10%"), Some(10.0));
        assert_eq!(parse_percent_label("-5%"), Some(-5.0));
        assert_eq!(parse_percent_label("\u{2212}5%"), Some(-5.0));
        assert_eq!(parse_percent_label("0%"), Some(0.0));
        assert_eq!(parse_percent_label("n/a"), None);
    }

    #[test]
    fn test_sort_percent_labels_numeric() {
        let mut labels: Vec<String> = ["+10%", "-5%", "0%", "+2%", "-10%", "+5%"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sort_percent_labels(&mut labels);
        assert_eq!(labels, ["-10%", "-5%", "0%", "+2%", "+5%", "+10%"]);
    }

    #[test]
    fn test_grid_row_count_and_pivot_shape() {
        let grid = default_grid(&baseline());

        assert_eq!(grid.rows.len(), 25);
        assert_eq!(grid.pivot.row_count(), 5);
        assert_eq!(grid.pivot.column_count(), 5);
        assert_eq!(grid.collapsed_pairs, 0);
        assert_eq!(grid.pivot.row_labels, ["5%", "8%", "10%", "12%", "15%"]);
        assert_eq!(
            grid.pivot.column_labels,
            ["-10%", "-5%", "0%", "+5%", "+10%"]
        );
    }

    #[test]
    fn test_grid_center_matches_baseline() {
        let calc = MarginCalculator::default();
        let grid = build_grid(&calc, &baseline(), &SensitivityConfig::default());

        let expected = round_to(calc.compute(&baseline()).gross_margin_percent, 2);
        assert_eq!(grid.pivot.get("10%", "0%"), Some(expected));
        assert_eq!(expected, 61.67);
    }

    #[test]
    fn test_grid_rows_keep_full_precision() {
        let grid = default_grid(&baseline());
        let center = grid
            .rows
            .iter()
            .find(|r| r.discount_value == 10.0 && r.cost_multiplier == 1.0)
            .unwrap();
        assert!((center.result.gross_margin_percent - 61.666_666_666).abs() < 1e-6);
    }

    #[test]
    fn test_grid_margin_decreases_along_cost_axis() {
        let grid = default_grid(&baseline());
        for cells in &grid.pivot.cells {
            let values: Vec<f64> = cells.iter().map(|c| c.unwrap()).collect();
            assert!(values.windows(2).all(|w| w[0] > w[1]));
        }
    }

    #[test]
    fn test_absolute_discount_rows_sorted_numerically() {
        let input = PricingInput::new(200.0)
            .with_discount(Discount::Absolute(4.0))
            .with_region(Region::Other)
            .with_unit_cost(20.0);
        let grid = default_grid(&input);

        assert_eq!(grid.rows.len(), 4 * 5);
        assert_eq!(
            grid.pivot.row_labels,
            ["R$ 0,00", "R$ 4,00", "R$ 8,00", "R$ 14,00"]
        );
    }

    #[test]
    fn test_zero_price_grid_is_all_zero_margin() {
        let input = PricingInput::new(0.0).with_unit_cost(10.0);
        let grid = default_grid(&input);

        assert!(!grid.rows.is_empty());
        assert!(grid.rows.iter().all(|r| r.result.gross_margin_percent == 0.0));
        assert!(grid.pivot.cells.iter().flatten().all(|c| *c == Some(0.0)));
    }

    #[test]
    fn test_colliding_cost_labels_collapse_last_wins() {
        let config = SensitivityConfig {
            discount_steps: vec![0.0],
            cost_multipliers: vec![1.0, 1.001],
            ..SensitivityConfig::default()
        };
        let grid = build_grid(&MarginCalculator::default(), &baseline(), &config);

        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.pivot.column_labels, ["0%"]);
        assert_eq!(grid.collapsed_pairs, 1);
        let last = round_to(grid.rows[1].result.gross_margin_percent, 2);
        assert_eq!(grid.pivot.get("10%", "0%"), Some(last));
    }
}
