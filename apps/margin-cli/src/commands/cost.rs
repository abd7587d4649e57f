//! `margin cost <product>...`: resolve unit costs from the catalog.

use std::io::Write;

use clap::Args;
use margin_core::CostResolution;

use super::CostLookup;
use crate::config::AppConfig;
use crate::error::AppResult;

#[derive(Debug, Clone, Args)]
pub struct CostArgs {
    /// Product names, matched case- and accent-insensitively
    #[arg(required = true)]
    pub products: Vec<String>,
}

/// Prints one line per product. The catalog is read once for all of them.
pub fn execute(
    args: &CostArgs,
    config: &AppConfig,
    lookup: &mut CostLookup,
    out: &mut impl Write,
) -> AppResult<()> {
    let currency = config.currency_format();
    for product in &args.products {
        match lookup.resolve(product) {
            CostResolution::Known { cost } => {
                writeln!(out, "{}: {}", product.trim(), currency.format(cost))?;
            }
            CostResolution::Unresolved { reason } => {
                writeln!(out, "{}: unresolved ({})", product.trim(), reason)?;
            }
        }
    }
    Ok(())
}
