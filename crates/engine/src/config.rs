// hgdb-legup - LegUp to hgdb debug database converter
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Conversion configuration.
//!
//! A configuration can be read from a TOML file; every field is optional and
//! falls back to the LegUp defaults:
//!
//! ```toml
//! [source]
//! kind = "mysql"
//!
//! [source.mysql]
//! host = "localhost"
//! port = 3306
//! user = "root"
//! password = "letmein"
//! database = "legupDebug"
//!
//! [synthesis]
//! strict = false
//! max_reported_examples = 5
//!
//! [output]
//! overwrite = false
//! ```

use std::{fs, path::PathBuf};

use eyre::WrapErr;
use hgdb_legup_common::{ConvertError, DEFAULT_MAX_REPORTED_EXAMPLES};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::InvalidRecordPolicy;

/// Query run against the LegUp debug database when none is configured.
///
/// Each IR instruction is attributed to the state it starts in and to the
/// high-level statement it was generated from.
pub const DEFAULT_STATE_LINE_QUERY: &str = "\
SELECT State.number AS state_id, \
HLStatement.file_name AS filename, \
HLStatement.line_number AS line_number \
FROM IRInstr \
INNER JOIN State ON IRInstr.startStateId = State.id \
INNER JOIN HLStatement ON IRInstr.hlStatementId = HLStatement.id \
ORDER BY IRInstr.id";

/// Top-level configuration of a conversion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConvertConfig {
    /// Where the state to line mapping is read from
    pub source: SourceConfig,
    /// How state locations become breakpoints
    pub synthesis: SynthesisConfig,
    /// How the debug database is written
    pub output: OutputConfig,
}

impl ConvertConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConvertError> {
        let path = path.into();
        let content = fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))
            .map_err(ConvertError::Config)?;
        let config = Self::from_toml(&content)?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConvertError> {
        toml::from_str(content)
            .wrap_err("Failed to parse config file as TOML")
            .map_err(ConvertError::Config)
    }

    /// Read from a SQLite snapshot at `path`
    pub fn with_sqlite_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source.kind = SourceKind::Sqlite;
        self.source.sqlite.path = Some(path.into());
        self
    }

    /// Override the extraction query
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.source.query = Some(query.into());
        self
    }

    /// Abort on the first invalid record instead of skipping it
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.synthesis.strict = strict;
        self
    }

    /// Replace an existing output database
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.output.overwrite = overwrite;
        self
    }
}

/// Which backend holds the debug data.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The live LegUp debug database
    #[default]
    Mysql,
    /// A SQLite snapshot with the same tables
    Sqlite,
}

/// Data source settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourceConfig {
    /// Active backend
    pub kind: SourceKind,
    /// Extraction query; [`DEFAULT_STATE_LINE_QUERY`] if unset
    pub query: Option<String>,
    /// MySQL connection settings
    pub mysql: MysqlConfig,
    /// SQLite snapshot settings
    pub sqlite: SqliteConfig,
}

impl SourceConfig {
    /// The query to run against the source.
    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or(DEFAULT_STATE_LINE_QUERY)
    }
}

/// MySQL connection settings, defaulting to the ones LegUp installs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MysqlConfig {
    /// Server host name or IP
    pub host: String,
    /// Server TCP port
    pub port: u16,
    /// User name
    pub user: String,
    /// Password
    pub password: String,
    /// Database holding the debug tables
    pub database: String,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: Option<u64>,
}

impl Default for MysqlConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3306,
            user: "root".into(),
            password: "letmein".into(),
            database: "legupDebug".into(),
            connect_timeout_secs: Some(10),
        }
    }
}

/// SQLite snapshot settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SqliteConfig {
    /// Path of the snapshot
    pub path: Option<PathBuf>,
}

/// Synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Fail on the first invalid record
    pub strict: bool,
    /// Number of skipped records kept for the summary
    pub max_reported_examples: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self { strict: false, max_reported_examples: DEFAULT_MAX_REPORTED_EXAMPLES }
    }
}

impl SynthesisConfig {
    /// The invalid-record policy these settings select.
    pub fn policy(&self) -> InvalidRecordPolicy {
        if self.strict {
            InvalidRecordPolicy::Abort
        } else {
            InvalidRecordPolicy::Skip
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Replace the output database if it already exists
    pub overwrite: bool,
}
