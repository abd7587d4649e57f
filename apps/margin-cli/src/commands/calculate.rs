//! # `margin calc`
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  flags ──► parse_amount / FromStr ──► PricingInput                      │
//! │                                            │                            │
//! │  --cost | --product (catalog) ──► CostResolution                        │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                            margin_core::analyze()                       │
//! │                                            │                            │
//! │        ┌───────────────┬──────────────────┼───────────────┐            │
//! │        ▼               ▼                  ▼               ▼            │
//! │     --json       summary + pivot     --proposal   --raw-csv/--pivot-csv │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use margin_core::proposal::Proposal;
use margin_core::{
    analyze, parse_amount, AmountKind, CostResolution, MarginAnalysis, MarginCalculator,
    PricingInput, Region, RegionalFactors, TaxPolicy,
};
use margin_data::{write_pivot_file, write_raw_rows_file};
use serde::Serialize;
use tracing::info;

use super::CostLookup;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::render::{render_pivot, render_summary};

/// Flags of `margin calc`.
///
/// Amounts accept locale formats: `1.234,56`, `R$ 12,50`, `12.5`. Negative
/// amounts (`--cost -5`) are taken as values so validation can report them.
#[derive(Debug, Clone, Args)]
pub struct CalcArgs {
    /// Sale price before discount
    #[arg(long, short = 'p', allow_hyphen_values = true)]
    pub price: String,

    /// Discount value
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub discount: String,

    /// percent | absolute
    #[arg(long, default_value = "percent")]
    pub discount_type: AmountKind,

    /// Tax value
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub tax: String,

    /// percent | absolute
    #[arg(long, default_value = "percent")]
    pub tax_type: AmountKind,

    /// Legacy absolute tax; only used with --policy absolute-overrides-percent
    #[arg(long, allow_hyphen_values = true)]
    pub tax_override: Option<String>,

    /// primary | other
    #[arg(long, default_value = "primary")]
    pub region: Region,

    #[arg(long, allow_hyphen_values = true)]
    pub primary_factor: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub other_factor: Option<String>,

    /// Unit cost. Takes precedence over --product
    #[arg(long, allow_hyphen_values = true)]
    pub cost: Option<String>,

    /// Product name; looked up in the cost catalog when --cost is absent
    #[arg(long)]
    pub product: Option<String>,

    /// strict | absolute-overrides-percent
    #[arg(long)]
    pub policy: Option<TaxPolicy>,

    /// Print the commercial proposal text
    #[arg(long)]
    pub proposal: bool,

    /// Proposal date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Print everything as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Write the raw sensitivity rows to this CSV file
    #[arg(long)]
    pub raw_csv: Option<PathBuf>,

    /// Write the pivot table to this CSV file
    #[arg(long)]
    pub pivot_csv: Option<PathBuf>,
}

impl CalcArgs {
    /// Builds the pricing input from flags, falling back to `config` for
    /// the regional factors. The unit cost is left at 0; it comes from
    /// [`CalcArgs::cost_resolution`].
    pub fn pricing_input(&self, config: &AppConfig) -> AppResult<PricingInput> {
        let defaults = config.regional_factors();
        let primary = parse_optional(self.primary_factor.as_deref())?;
        let other = parse_optional(self.other_factor.as_deref())?;
        let factors = RegionalFactors::new(
            primary.unwrap_or(defaults.primary),
            other.unwrap_or(defaults.other),
        );

        Ok(PricingInput::new(parse_amount(&self.price)?)
            .with_discount(self.discount_type.discount(parse_amount(&self.discount)?))
            .with_tax(self.tax_type.tax(parse_amount(&self.tax)?))
            .with_tax_override(parse_optional(self.tax_override.as_deref())?)
            .with_region(self.region)
            .with_factors(factors))
    }

    pub fn calculator(&self, config: &AppConfig) -> MarginCalculator {
        match self.policy {
            Some(policy) => MarginCalculator::new(policy),
            None => config.calculator(),
        }
    }

    /// `--cost` wins; otherwise `--product` is looked up; neither means a
    /// known cost of 0.
    pub fn cost_resolution(&self, lookup: &mut CostLookup) -> AppResult<CostResolution> {
        if let Some(cost) = &self.cost {
            return Ok(CostResolution::known(parse_amount(cost)?));
        }
        Ok(match &self.product {
            Some(product) => lookup.resolve(product),
            None => CostResolution::known(0.0),
        })
    }
}

fn parse_optional(value: Option<&str>) -> AppResult<Option<f64>> {
    Ok(value.map(parse_amount).transpose()?)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    analysis: &'a MarginAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    proposal: Option<String>,
}

/// Runs `margin calc`. Results go to `out`, warnings to `warnings`.
pub fn execute(
    args: &CalcArgs,
    config: &AppConfig,
    lookup: &mut CostLookup,
    out: &mut impl Write,
    warnings: &mut impl Write,
) -> AppResult<()> {
    let calculator = args.calculator(config);
    let input = args.pricing_input(config)?;
    let cost = args.cost_resolution(lookup)?;

    let analysis = analyze(&calculator, &input, cost, &config.sensitivity_config())?;
    for warning in &analysis.warnings {
        writeln!(warnings, "warning: {}", warning)?;
    }

    let currency = config.currency_format();
    let proposal = args.proposal.then(|| {
        let issued_on = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());
        Proposal::new(
            args.product.as_deref(),
            &analysis.input,
            &analysis.result,
            issued_on,
        )
        .render(&currency)
    });

    if args.json {
        let report = JsonReport {
            analysis: &analysis,
            proposal,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", render_summary(&analysis.result, &currency))?;
        writeln!(
            out,
            "Gross margin (%) by discount (rows) and cost change (columns)"
        )?;
        write!(out, "{}", render_pivot(&analysis.grid.pivot))?;
        if let Some(text) = proposal {
            writeln!(out)?;
            writeln!(out, "{}", text)?;
        }
    }

    if let Some(path) = &args.raw_csv {
        write_raw_rows_file(path, &analysis.grid.rows)?;
    }
    if let Some(path) = &args.pivot_csv {
        write_pivot_file(path, &analysis.grid.pivot)?;
    }

    info!(
        policy = %calculator.tax_policy,
        margin = analysis.result.gross_margin_percent,
        rows = analysis.grid.rows.len(),
        "Calculation finished"
    );
    Ok(())
}
