//! inspect2hgdb - LegUp to hgdb debug database converter
//!
//! Reads the FSM state to source line mapping that LegUp records in its debug
//! database and writes the matching hgdb breakpoint table.

use std::path::PathBuf;

use clap::Parser;
use eyre::{Result, WrapErr};
use hgdb_legup_common::logging;

mod cmd;
mod settings;

/// Command-line interface for inspect2hgdb
#[derive(Debug, Parser)]
#[command(name = "inspect2hgdb")]
#[command(about = "Convert LegUp HLS debug data into an hgdb debug database")]
#[command(version)]
pub struct Cli {
    /// Path of the hgdb debug database to create
    #[arg(required_unless_present = "dry_run")]
    pub output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, env = "INSPECT2HGDB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read from a SQLite snapshot of the LegUp debug database instead of MySQL
    #[arg(long, value_name = "FILE")]
    pub sqlite: Option<PathBuf>,

    /// MySQL host of the LegUp debug database
    #[arg(long, env = "LEGUP_DB_HOST")]
    pub host: Option<String>,

    /// MySQL port of the LegUp debug database
    #[arg(long, env = "LEGUP_DB_PORT")]
    pub port: Option<u16>,

    /// MySQL user
    #[arg(long, env = "LEGUP_DB_USER")]
    pub user: Option<String>,

    /// MySQL password
    #[arg(long, env = "LEGUP_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Name of the LegUp debug database
    #[arg(long, env = "LEGUP_DB_NAME")]
    pub database: Option<String>,

    /// Extraction query returning state_id, filename and line_number columns
    #[arg(long, value_name = "SQL")]
    pub query: Option<String>,

    /// Abort on the first state location without a usable source position
    #[arg(long)]
    pub strict: bool,

    /// Overwrite the output database if it already exists
    #[arg(long)]
    pub force: bool,

    /// Print the breakpoints as JSON instead of writing the output database
    #[arg(long)]
    pub dry_run: bool,

    /// Also write logs to a rolling file in the temp directory
    #[arg(long)]
    pub log_file: bool,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    logging::init_logging("inspect2hgdb", cli.log_file)?;

    let config = settings::resolve(&cli).wrap_err("failed to load configuration")?;

    if cli.dry_run {
        return cmd::print_preview(config);
    }

    match &cli.output {
        Some(output) => cmd::convert_to(config, output),
        None => eyre::bail!("no output database given"),
    }
}
