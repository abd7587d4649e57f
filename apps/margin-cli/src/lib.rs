//! # margin: Margin Calculator CLI
//!
//! Command-line front end for the margin engine.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Parse flags (clap) ───────────────────────────────────────────────► │
//! │                                                                         │
//! │  2. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter, written to stderr             │
//! │     • Default: warn,margin=info; --verbose → debug; RUST_LOG wins       │
//! │                                                                         │
//! │  3. Load Configuration ───────────────────────────────────────────────► │
//! │     • --config <file> or platform config dir                            │
//! │     • MARGIN_* environment overrides, then validation                   │
//! │                                                                         │
//! │  4. Dispatch Command ─────────────────────────────────────────────────► │
//! │     • calc | cost | config                                              │
//! │                                                                         │
//! │  5. Exit Code ────────────────────────────────────────────────────────► │
//! │     • 0 ok, 2 invalid input, 3 config, 4 data/io, 1 other               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod render;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::calculate::CalcArgs;
use commands::cost::CostArgs;
use commands::CostLookup;
use config::AppConfig;
use error::AppResult;

/// Margin calculator: pricing, gross margin and sensitivity analysis.
#[derive(Debug, Parser)]
#[command(name = "margin", version, about)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute margin, sensitivity grid and optional proposal
    Calc(CalcArgs),
    /// Look up product unit costs in the catalog
    Cost(CostArgs),
    /// Print the effective configuration
    Config,
}

/// Runs the CLI and returns the process exit code.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(&cli, &mut io::stdout().lock(), &mut io::stderr()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            for message in err.messages() {
                eprintln!("error: {}", message);
            }
            ExitCode::from(err.exit_code())
        }
    }
}

/// Loads configuration and runs the selected command.
pub fn dispatch(
    cli: &Cli,
    out: &mut impl io::Write,
    err: &mut impl io::Write,
) -> AppResult<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    debug!(policy = %config.pricing.tax_policy, "Configuration loaded");

    let mut lookup = CostLookup::from_config(&config);

    match &cli.command {
        Command::Calc(args) => commands::calculate::execute(args, &config, &mut lookup, out, err),
        Command::Cost(args) => commands::cost::execute(args, &config, &mut lookup, out),
        Command::Config => commands::config::execute(&config, out),
    }
}

/// Initializes the tracing subscriber.
///
/// Writes to stderr so stdout carries only command output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn,margin=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
