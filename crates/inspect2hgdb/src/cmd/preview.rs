//! Preview command - print the breakpoints without writing anything

use eyre::{Result, WrapErr};
use hgdb_legup_engine::{ConvertConfig, Converter};

/// Runs the conversion and prints the result as JSON on stdout.
pub fn print_preview(config: ConvertConfig) -> Result<()> {
    tracing::info!("Dry run, no debug database will be written");

    let conversion = Converter::new(config).preview().wrap_err("failed to convert debug data")?;
    println!("{}", conversion.to_json()?);
    Ok(())
}
