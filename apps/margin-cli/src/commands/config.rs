//! `margin config`: print the effective configuration as TOML.

use std::io::Write;

use crate::config::AppConfig;
use crate::error::AppResult;

pub fn execute(config: &AppConfig, out: &mut impl Write) -> AppResult<()> {
    if let Some(path) = AppConfig::default_config_path() {
        writeln!(out, "# default config file: {}", path.display())?;
    }
    write!(out, "{}", config.to_toml_string()?)?;
    Ok(())
}
