//! End-to-end pricing scenarios and engine properties.

use margin_core::money::round_to;
use margin_core::sensitivity::{effective_discounts, sort_percent_labels, DEFAULT_DISCOUNT_STEPS};
use margin_core::validation::validate_pricing_input;
use margin_core::{
    analyze, build_grid, compute, CoreError, CostResolution, Discount, MarginCalculator,
    PricingInput, Region, SensitivityConfig, TaxPolicy, TaxSpec,
};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_primary_region_percent_tax() {
    let input = PricingInput::new(100.0)
        .with_discount(Discount::Percent(10.0))
        .with_region(Region::Primary)
        .with_tax(TaxSpec::Percent(5.0))
        .with_unit_cost(30.0);

    let r = compute(&input);
    assert_close(r.discount_amount, 10.0);
    assert_close(r.net_price, 90.0);
    assert_close(r.revenue_after_region, 90.0);
    assert_close(r.tax_amount, 4.5);
    assert_close(r.gross_profit, 55.5);
    assert_eq!(round_to(r.gross_margin_percent, 2), 61.67);
}

#[test]
fn scenario_zero_price_rejected_before_compute() {
    let input = PricingInput::new(0.0).with_unit_cost(10.0);

    assert!(validate_pricing_input(&input).is_err());
    let err = analyze(
        &MarginCalculator::default(),
        &input,
        CostResolution::known(10.0),
        &SensitivityConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    // the calculator itself tolerates it
    let r = compute(&input);
    assert_eq!(r.net_price, 0.0);
    assert_eq!(r.revenue_after_region, 0.0);
    assert_eq!(r.gross_margin_percent, 0.0);
}

#[test]
fn scenario_other_region_absolute_tax() {
    let input = PricingInput::new(200.0)
        .with_discount(Discount::Absolute(0.0))
        .with_tax(TaxSpec::Absolute(10.0))
        .with_region(Region::Other)
        .with_unit_cost(50.0);

    let r = compute(&input);
    assert_close(r.net_price, 200.0);
    assert_close(r.revenue_after_region, 100.0);
    assert_close(r.tax_amount, 10.0);
    assert_close(r.gross_profit, 40.0);
    assert_eq!(round_to(r.gross_margin_percent, 2), 40.0);
}

#[test]
fn scenario_tax_policy_switch() {
    let input = PricingInput::new(100.0)
        .with_tax(TaxSpec::Percent(10.0))
        .with_tax_override(Some(3.0))
        .with_unit_cost(20.0);

    let compute_under = |policy| MarginCalculator::new(policy).compute(&input);
    let strict = compute_under(TaxPolicy::Strict);
    let legacy = compute_under(TaxPolicy::AbsoluteOverridesPercent);

    assert_close(strict.tax_amount, 10.0);
    assert_close(legacy.tax_amount, 3.0);
    assert!(legacy.gross_profit > strict.gross_profit);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn property_net_price_never_negative() {
    for price in [0.0, 0.01, 1.0, 50.0, 100.0, 12_345.67] {
        for discount in [
            Discount::Percent(0.0),
            Discount::Percent(50.0),
            Discount::Percent(100.0),
            Discount::Absolute(0.0),
            Discount::Absolute(price),
            Discount::Absolute(price * 3.0 + 1.0),
        ] {
            let r = compute(&PricingInput::new(price).with_discount(discount));
            assert!(r.net_price >= 0.0, "price {price}, discount {discount:?}");
        }
    }
}

#[test]
fn property_zero_revenue_means_zero_margin() {
    let ten = PricingInput::new(10.0);
    let cases = [
        PricingInput::new(0.0).with_unit_cost(5.0),
        ten.with_discount(Discount::Absolute(10.0)),
        ten.with_discount(Discount::Percent(100.0)),
    ];
    for input in cases {
        let r = compute(&input);
        assert_eq!(r.revenue_after_region, 0.0);
        assert_eq!(r.gross_margin_percent, 0.0);
    }
}

#[test]
fn property_grid_size_matches_unique_discounts_times_multipliers() {
    let config = SensitivityConfig::default();
    let steps = &config.discount_steps;
    for base in [0.0, 1.0, 3.0, 10.0, 97.0] {
        let input = PricingInput::new(80.0)
            .with_discount(Discount::Percent(base))
            .with_unit_cost(20.0);
        let unique = effective_discounts(&input.discount, input.sale_price, steps);

        let grid = build_grid(&MarginCalculator::default(), &input, &config);
        let expected_rows = unique.len() * config.cost_multipliers.len();
        assert_eq!(grid.rows.len(), expected_rows);
        assert!(grid.pivot.row_count() <= unique.len());
        assert!(grid.pivot.column_count() <= config.cost_multipliers.len());
        assert_eq!(
            grid.collapsed_pairs, 0,
            "dedup should prevent conflicts (base {base})"
        );
    }
}

#[test]
fn property_clamped_discounts_deduplicate() {
    let unique = effective_discounts(&Discount::Percent(1.0), 100.0, &DEFAULT_DISCOUNT_STEPS);
    assert_eq!(unique, vec![0.0, 1.0, 3.0, 6.0]);
}

#[test]
fn property_column_labels_sort_numerically() {
    let mut labels: Vec<String> = ["+10%", "-5%", "0%", "+2%"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    sort_percent_labels(&mut labels);
    assert_eq!(labels, ["-5%", "0%", "+2%", "+10%"]);
}

#[test]
fn property_pivot_cells_are_rounded_rows_are_not() {
    let input = PricingInput::new(100.0)
        .with_discount(Discount::Percent(10.0))
        .with_tax(TaxSpec::Percent(5.0))
        .with_unit_cost(30.0);
    let config = SensitivityConfig::default();
    let grid = build_grid(&MarginCalculator::default(), &input, &config);

    for (r, label) in grid.pivot.row_labels.iter().enumerate() {
        for (c, column) in grid.pivot.column_labels.iter().enumerate() {
            let cell = grid.pivot.cells[r][c].unwrap();
            assert_eq!(cell, round_to(cell, 2));

            let raw = grid
                .rows
                .iter()
                .find(|row| &row.discount_label == label && &row.cost_label == column)
                .unwrap();
            assert_eq!(cell, round_to(raw.result.gross_margin_percent, 2));
        }
    }
}
