//! Configuration resolution
//!
//! Values come from, in decreasing priority: command-line flags, environment
//! variables (handled by clap), the TOML config file, and built-in defaults.

use eyre::Result;
use hgdb_legup_engine::ConvertConfig;

use crate::Cli;

/// Builds the effective configuration for this invocation.
pub fn resolve(cli: &Cli) -> Result<ConvertConfig> {
    let mut config = match &cli.config {
        Some(path) => ConvertConfig::load(path)?,
        None => ConvertConfig::default(),
    };

    if let Some(path) = &cli.sqlite {
        config = config.with_sqlite_source(path);
    }

    let mysql = &mut config.source.mysql;
    if let Some(host) = &cli.host {
        mysql.host = host.clone();
    }
    if let Some(port) = cli.port {
        mysql.port = port;
    }
    if let Some(user) = &cli.user {
        mysql.user = user.clone();
    }
    if let Some(password) = &cli.password {
        mysql.password = password.clone();
    }
    if let Some(database) = &cli.database {
        mysql.database = database.clone();
    }

    if let Some(query) = &cli.query {
        config = config.with_query(query);
    }
    // Flags can only switch these on; a config file may already have done so
    if cli.strict {
        config = config.with_strict(true);
    }
    if cli.force {
        config = config.with_overwrite(true);
    }

    tracing::debug!(
        source = ?config.source.kind,
        strict = config.synthesis.strict,
        "Resolved configuration"
    );
    Ok(config)
}
