//! # Commercial Proposal
//!
//! Plain-text summary of one calculation, meant to be copied into an email
//! or chat message.
//!
//! ```text
//! COMMERCIAL PROPOSAL
//! Product: Sérum Vitamina C 30ml
//! Date: 2024-03-01
//! Sale price: R$ 100,00
//! Discount: 10.00% (= R$ 10,00)
//! Net price: R$ 90,00
//! Region: primary (factor 1.00)
//! Revenue after region: R$ 90,00
//! Taxes: R$ 4,50
//! Unit cost: R$ 30,00
//! Gross profit: R$ 55,50
//! Gross margin: 61.67%
//! ```

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::money::{format_percent, CurrencyFormat};
use crate::types::{Discount, PricingInput, PricingResult, Region};

pub const PROPOSAL_TITLE: &str = "COMMERCIAL PROPOSAL";

/// A rendered-on-demand proposal for one computed deal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proposal {
    /// `None` or blank renders as `-`.
    pub product_name: Option<String>,
    pub issued_on: NaiveDate,
    pub sale_price: f64,
    pub discount: Discount,
    pub region: Region,
    pub result: PricingResult,
}

impl Proposal {
    pub fn new(
        product_name: Option<&str>,
        input: &PricingInput,
        result: &PricingResult,
        issued_on: NaiveDate,
    ) -> Self {
        Proposal {
            product_name: product_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            issued_on,
            sale_price: input.sale_price,
            discount: input.discount,
            region: input.region,
            result: *result,
        }
    }

    /// Renders the proposal block, one `Label: value` per line.
    pub fn render(&self, currency: &CurrencyFormat) -> String {
        let r = &self.result;
        let mut out = String::with_capacity(512);

        // writing to a String cannot fail
        let _ = writeln!(out, "{}", PROPOSAL_TITLE);
        let product = self.product_name.as_deref().unwrap_or("-");
        let _ = writeln!(out, "Product: {}", product);
        let _ = writeln!(out, "Date: {}", self.issued_on.format("%Y-%m-%d"));
        let _ = writeln!(out, "Sale price: {}", currency.format(self.sale_price));
        let _ = writeln!(out, "Discount: {}", self.discount_line(currency));
        let _ = writeln!(out, "Net price: {}", currency.format(r.net_price));
        let _ = writeln!(
            out,
            "Region: {} (factor {:.2})",
            self.region, r.regional_factor
        );
        let _ = writeln!(
            out,
            "Revenue after region: {}",
            currency.format(r.revenue_after_region)
        );
        let _ = writeln!(out, "Taxes: {}", currency.format(r.tax_amount));
        let _ = writeln!(out, "Unit cost: {}", currency.format(r.unit_cost));
        let _ = writeln!(out, "Gross profit: {}", currency.format(r.gross_profit));
        let margin = format_percent(r.gross_margin_percent);
        let _ = write!(out, "Gross margin: {}", margin);

        out
    }

    fn discount_line(&self, currency: &CurrencyFormat) -> String {
        match self.discount {
            Discount::Percent(p) => format!(
                "{} (= {})",
                format_percent(p),
                currency.format(self.result.discount_amount)
            ),
            Discount::Absolute(_) => currency.format(self.result.discount_amount),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
