//! Plain-text rendering of results for the terminal.

use std::fmt::Write as _;

use margin_core::money::format_percent;
use margin_core::{CurrencyFormat, PivotTable, PricingResult};

/// Label / value block of one calculation.
pub fn render_summary(result: &PricingResult, currency: &CurrencyFormat) -> String {
    let rows = [
        ("Discount", currency.format(result.discount_amount)),
        ("Net price", currency.format(result.net_price)),
        ("Regional factor", format!("{:.2}", result.regional_factor)),
        (
            "Revenue after region",
            currency.format(result.revenue_after_region),
        ),
        ("Taxes", currency.format(result.tax_amount)),
        ("Unit cost", currency.format(result.unit_cost)),
        ("Gross profit", currency.format(result.gross_profit)),
        ("Gross margin", format_percent(result.gross_margin_percent)),
    ];

    let label_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{:<label_width$}  {:>16}", label, value);
    }
    out
}

/// Right-aligned pivot grid: discount labels down, cost labels across.
pub fn render_pivot(pivot: &PivotTable) -> String {
    const CORNER: &str = "discount \\ cost";

    let cells: Vec<Vec<String>> = pivot
        .cells
        .iter()
        .map(|row| row.iter().map(|c| cell_text(*c)).collect())
        .collect();

    let first_width = pivot
        .row_labels
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once(CORNER.len()))
        .max()
        .unwrap_or(0);
    let column_widths: Vec<usize> = pivot
        .column_labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|s| s.len())
                .chain(std::iter::once(label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:<width$}", CORNER, width = first_width);
    for (label, width) in pivot.column_labels.iter().zip(&column_widths) {
        let _ = write!(out, "  {:>width$}", label, width = width);
    }
    out.push('\n');

    for (label, row) in pivot.row_labels.iter().zip(&cells) {
        let _ = write!(out, "{:<width$}", label, width = first_width);
        for (cell, width) in row.iter().zip(&column_widths) {
            let _ = write!(out, "  {:>width$}", cell, width = width);
        }
        out.push('\n');
    }
    out
}

fn cell_text(cell: Option<f64>) -> String {
    match cell {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}
