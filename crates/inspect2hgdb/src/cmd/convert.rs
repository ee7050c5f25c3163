//! Convert command - write the hgdb breakpoint table

use std::path::Path;

use eyre::{Result, WrapErr};
use hgdb_legup_engine::{ConvertConfig, Converter, Outcome};

/// Converts the configured source into the debug database at `output`.
pub fn convert_to(config: ConvertConfig, output: &Path) -> Result<()> {
    tracing::info!("Converting LegUp debug data into {}", output.display());

    let report = Converter::new(config)
        .run(output)
        .wrap_err_with(|| format!("failed to build {}", output.display()))?;

    // The summary goes to stderr together with the logs; stdout stays clean
    match report.outcome() {
        outcome @ Outcome::NoDebugData { .. } => eprintln!("{}: {outcome}", output.display()),
        outcome => eprintln!("{outcome} to {}", output.display()),
    }
    Ok(())
}
