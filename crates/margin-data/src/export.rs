//! # Sensitivity CSV Export
//!
//! Two downloadable artifacts per calculation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RAW  (one record per discount × cost multiplier, full precision)      │
//! │  discount_value,cost_multiplier,discount_label,cost_label,...,         │
//! │  gross_margin_percent                                                  │
//! │  5.0,0.9,5%,-10%,5.0,95.0,1.0,95.0,4.75,27.0,63.25,66.57894736842105   │
//! │                                                                         │
//! │  PIVOT  (one line per discount label, margin % with two decimals)      │
//! │  discount,-10%,-5%,0%,+5%,+10%                                          │
//! │  5%,66.58,65.00,63.42,61.84,60.26                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writers take any `io::Write`; the `*_file` helpers create the file.

use std::fs::File;
use std::io;
use std::path::Path;

use margin_core::{PivotTable, SensitivityRow};
use serde::Serialize;
use tracing::info;

use crate::error::DataResult;

/// Header of the raw dataset, in column order.
pub const RAW_HEADER: [&str; 12] = [
    "discount_value",
    "cost_multiplier",
    "discount_label",
    "cost_label",
    "discount_amount",
    "net_price",
    "regional_factor",
    "revenue_after_region",
    "tax_amount",
    "unit_cost",
    "gross_profit",
    "gross_margin_percent",
];

/// First header cell of the pivot export.
pub const PIVOT_INDEX_HEADER: &str = "discount";

/// Flat view of a [`SensitivityRow`]; csv cannot serialize nested structs.
#[derive(Serialize)]
struct RawRecord<'a> {
    discount_value: f64,
    cost_multiplier: f64,
    discount_label: &'a str,
    cost_label: &'a str,
    discount_amount: f64,
    net_price: f64,
    regional_factor: f64,
    revenue_after_region: f64,
    tax_amount: f64,
    unit_cost: f64,
    gross_profit: f64,
    gross_margin_percent: f64,
}

impl<'a> From<&'a SensitivityRow> for RawRecord<'a> {
    fn from(row: &'a SensitivityRow) -> Self {
        let r = &row.result;
        RawRecord {
            discount_value: row.discount_value,
            cost_multiplier: row.cost_multiplier,
            discount_label: &row.discount_label,
            cost_label: &row.cost_label,
            discount_amount: r.discount_amount,
            net_price: r.net_price,
            regional_factor: r.regional_factor,
            revenue_after_region: r.revenue_after_region,
            tax_amount: r.tax_amount,
            unit_cost: r.unit_cost,
            gross_profit: r.gross_profit,
            gross_margin_percent: r.gross_margin_percent,
        }
    }
}

// =============================================================================
// Raw Rows
// =============================================================================

/// Writes the header and one record per row. The header is written even
/// when `rows` is empty.
pub fn write_raw_rows<W: io::Write>(writer: W, rows: &[SensitivityRow]) -> DataResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv.write_record(RAW_HEADER)?;
    for row in rows {
        csv.serialize(RawRecord::from(row))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_raw_rows_file(path: impl AsRef<Path>, rows: &[SensitivityRow]) -> DataResult<()> {
    let path = path.as_ref();
    write_raw_rows(File::create(path)?, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Raw sensitivity data written");
    Ok(())
}

// =============================================================================
// Pivot
// =============================================================================

/// Writes `discount,<cost labels...>` then one line per discount label.
///
/// Cells carry two decimals; a missing cell is an empty field.
pub fn write_pivot<W: io::Write>(writer: W, pivot: &PivotTable) -> DataResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_writer(writer);

    let labels = pivot.column_labels.iter().map(String::as_str);
    csv.write_record(std::iter::once(PIVOT_INDEX_HEADER).chain(labels))?;

    for (label, cells) in pivot.row_labels.iter().zip(&pivot.cells) {
        let mut record = Vec::with_capacity(cells.len() + 1);
        record.push(label.clone());
        record.extend(cells.iter().map(|cell| match cell {
            Some(v) => format!("{:.2}", v),
            None => String::new(),
        }));
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_pivot_file(path: impl AsRef<Path>, pivot: &PivotTable) -> DataResult<()> {
    let path = path.as_ref();
    write_pivot(File::create(path)?, pivot)?;
    info!(
        path = %path.display(),
        rows = pivot.row_count(),
        columns = pivot.column_count(),
        "Pivot table written"
    );
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
