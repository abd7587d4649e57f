//! # Application Configuration
//!
//! Configuration management for the `margin` binary.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority, one run only)                │
//! │     --policy legacy --other-factor 0.6                                 │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     MARGIN_TAX_POLICY=strict                                           │
//! │     MARGIN_CATALOG_PATH=/data/costs.csv                                │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/margin/config.toml (Linux)                               │
//! │     ~/Library/Application Support/com.margin.margin/config.toml (macOS)│
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [pricing]
//! tax_policy = "strict"          # strict | absolute-overrides-percent
//! primary_factor = 1.0
//! other_factor = 0.5
//!
//! [sensitivity]
//! discount_steps = [-5.0, -2.0, 0.0, 2.0, 5.0]
//! cost_multipliers = [0.9, 0.95, 1.0, 1.05, 1.1]
//!
//! [currency]
//! symbol = "R$"
//! decimal_separator = ","
//! thousands_separator = "."
//! decimals = 2
//!
//! [catalog]
//! path = "/data/costs.csv"
//! product_column = "product"
//! cost_column = "unit_cost"
//! ttl_secs = 300
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use margin_core::sensitivity::{DEFAULT_COST_MULTIPLIERS, DEFAULT_DISCOUNT_STEPS};
use margin_core::validation::validate_sensitivity_config;
use margin_core::{CurrencyFormat, MarginCalculator, RegionalFactors, SensitivityConfig, TaxPolicy};
use margin_data::CatalogColumns;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

// =============================================================================
// Sections
// =============================================================================

/// `[pricing]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default)]
    pub tax_policy: TaxPolicy,

    #[serde(default = "default_primary_factor")]
    pub primary_factor: f64,

    #[serde(default = "default_other_factor")]
    pub other_factor: f64,
}

fn default_primary_factor() -> f64 {
    RegionalFactors::DEFAULT_PRIMARY
}

fn default_other_factor() -> f64 {
    RegionalFactors::DEFAULT_OTHER
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            tax_policy: TaxPolicy::default(),
            primary_factor: default_primary_factor(),
            other_factor: default_other_factor(),
        }
    }
}

/// `[sensitivity]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySettings {
    #[serde(default = "default_discount_steps")]
    pub discount_steps: Vec<f64>,

    #[serde(default = "default_cost_multipliers")]
    pub cost_multipliers: Vec<f64>,
}

fn default_discount_steps() -> Vec<f64> {
    DEFAULT_DISCOUNT_STEPS.to_vec()
}

fn default_cost_multipliers() -> Vec<f64> {
    DEFAULT_COST_MULTIPLIERS.to_vec()
}

impl Default for SensitivitySettings {
    fn default() -> Self {
        SensitivitySettings {
            discount_steps: default_discount_steps(),
            cost_multipliers: default_cost_multipliers(),
        }
    }
}

/// `[currency]`. Display only; arithmetic is currency-agnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySettings {
    #[serde(default = "default_symbol")]
    pub symbol: String,

    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,

    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,

    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_symbol() -> String {
    CurrencyFormat::default().symbol
}

fn default_decimal_separator() -> char {
    CurrencyFormat::default().decimal_separator
}

fn default_thousands_separator() -> char {
    CurrencyFormat::default().thousands_separator
}

fn default_decimals() -> u8 {
    CurrencyFormat::default().decimals
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            symbol: default_symbol(),
            decimal_separator: default_decimal_separator(),
            thousands_separator: default_thousands_separator(),
            decimals: default_decimals(),
        }
    }
}

/// `[catalog]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// CSV export with product costs. No catalog when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_product_column")]
    pub product_column: String,

    #[serde(default = "default_cost_column")]
    pub cost_column: String,

    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_product_column() -> String {
    CatalogColumns::default().product
}

fn default_cost_column() -> String {
    CatalogColumns::default().cost
}

fn default_ttl_secs() -> u64 {
    margin_data::catalog::DEFAULT_TTL.as_secs()
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            path: None,
            product_column: default_product_column(),
            cost_column: default_cost_column(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete configuration of the `margin` binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub sensitivity: SensitivitySettings,

    #[serde(default)]
    pub currency: CurrencySettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `explicit_path` (must exist) or the platform default
    ///    (optional)
    /// 3. Environment variables
    pub fn load(explicit_path: Option<&Path>) -> AppResult<Self> {
        let mut config = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses one TOML file, without environment overrides.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if !(self.pricing.primary_factor >= 0.0 && self.pricing.primary_factor.is_finite()) {
            return Err(AppError::Config("pricing.primary_factor cannot be negative".into()));
        }
        if !(self.pricing.other_factor >= 0.0 && self.pricing.other_factor.is_finite()) {
            return Err(AppError::Config("pricing.other_factor cannot be negative".into()));
        }

        validate_sensitivity_config(&self.sensitivity_config())
            .map_err(|errors| AppError::Config(format!("sensitivity: {}", errors)))?;

        if self.currency.decimal_separator == self.currency.thousands_separator {
            return Err(AppError::Config(
                "currency.decimal_separator and currency.thousands_separator must differ".into(),
            ));
        }

        Ok(())
    }

    /// Applies `MARGIN_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`; unreadable values are logged and
    /// skipped.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Tax policy
        if let Some(policy) = lookup("MARGIN_TAX_POLICY") {
            match policy.parse() {
                Ok(parsed) => {
                    debug!(policy = %policy, "Overriding tax policy from environment");
                    self.pricing.tax_policy = parsed;
                }
                Err(_) => warn!(policy = %policy, "Unknown tax policy in environment"),
            }
        }

        // Regional factors
        if let Some(factor) = lookup("MARGIN_PRIMARY_FACTOR") {
            match margin_core::parse_amount(&factor) {
                Ok(f) => self.pricing.primary_factor = f,
                Err(_) => warn!(factor = %factor, "Invalid MARGIN_PRIMARY_FACTOR"),
            }
        }
        if let Some(factor) = lookup("MARGIN_OTHER_FACTOR") {
            match margin_core::parse_amount(&factor) {
                Ok(f) => self.pricing.other_factor = f,
                Err(_) => warn!(factor = %factor, "Invalid MARGIN_OTHER_FACTOR"),
            }
        }

        // Catalog path
        if let Some(path) = lookup("MARGIN_CATALOG_PATH") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog.path = if path.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }

        // Currency symbol
        if let Some(symbol) = lookup("MARGIN_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "margin", "margin")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Effective configuration as TOML.
    pub fn to_toml_string(&self) -> AppResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    // =========================================================================
    // Conversions into engine types
    // =========================================================================

    pub fn calculator(&self) -> MarginCalculator {
        MarginCalculator::new(self.pricing.tax_policy)
    }

    pub fn regional_factors(&self) -> RegionalFactors {
        RegionalFactors::new(self.pricing.primary_factor, self.pricing.other_factor)
    }

    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat {
            symbol: self.currency.symbol.clone(),
            decimal_separator: self.currency.decimal_separator,
            thousands_separator: self.currency.thousands_separator,
            decimals: self.currency.decimals,
        }
    }

    pub fn sensitivity_config(&self) -> SensitivityConfig {
        SensitivityConfig {
            discount_steps: self.sensitivity.discount_steps.clone(),
            cost_multipliers: self.sensitivity.cost_multipliers.clone(),
            currency: self.currency_format(),
        }
    }

    pub fn catalog_columns(&self) -> CatalogColumns {
        CatalogColumns::new(&self.catalog.product_column, &self.catalog.cost_column)
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog.ttl_secs)
    }
}
