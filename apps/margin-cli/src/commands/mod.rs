//! # CLI Commands
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports + shared helpers)
//! ├── calculate.rs  ◄─── `margin calc`: result, grid, proposal, exports
//! ├── cost.rs       ◄─── `margin cost`: catalog lookup
//! └── config.rs     ◄─── `margin config`: effective configuration
//! ```
//!
//! Every command takes its parsed arguments plus the loaded
//! [`AppConfig`](crate::config::AppConfig) and writes to a caller-supplied
//! `io::Write`, so tests capture output without a subprocess.

pub mod calculate;
pub mod config;
pub mod cost;

use margin_core::CostResolution;
use margin_data::{CachedCatalog, CsvFileSource};
use tracing::debug;

use crate::config::AppConfig;

/// Cost catalog shared by every lookup of one run.
///
/// The catalog file is read on the first lookup and reused until
/// `catalog.ttl_secs` elapses. No configured catalog is `Unresolved`,
/// never an error.
pub struct CostLookup {
    catalog: Option<CachedCatalog<CsvFileSource>>,
}

impl CostLookup {
    pub fn from_config(config: &AppConfig) -> Self {
        let catalog = config.catalog.path.as_ref().map(|path| {
            let source = CsvFileSource::new(path, config.catalog_columns());
            debug!(
                path = %source.path().display(),
                ttl_secs = config.catalog.ttl_secs,
                "Cost catalog configured"
            );
            CachedCatalog::new(source, config.catalog_ttl())
        });
        CostLookup { catalog }
    }

    pub fn resolve(&mut self, product: &str) -> CostResolution {
        match &mut self.catalog {
            Some(catalog) => catalog.lookup(product),
            None => CostResolution::unresolved("no cost catalog configured"),
        }
    }
}
