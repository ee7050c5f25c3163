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

//! Source extraction.
//!
//! A [`StateSource`] runs the extraction query once and returns every
//! `(state_id, filename, line_number)` row in the order the database yields
//! them. The result must expose those three columns; anything else in the
//! result set is ignored.

use hgdb_legup_common::{ConvertError, StateLocation};
use tracing::info;

use crate::{SourceConfig, SourceKind};

mod sqlite;
pub use sqlite::SqliteSource;

#[cfg(feature = "mysql")]
mod mysql_source;
#[cfg(feature = "mysql")]
pub use mysql_source::MysqlSource;

/// Columns the extraction query must return.
pub const REQUIRED_COLUMNS: [&str; 3] = ["state_id", "filename", "line_number"];

/// A data source holding LegUp's state to source line mapping.
pub trait StateSource {
    /// Reads every state location, in source order.
    fn fetch_state_locations(&mut self) -> Result<Vec<StateLocation>, ConvertError>;
}

impl<T: StateSource + ?Sized> StateSource for Box<T> {
    fn fetch_state_locations(&mut self) -> Result<Vec<StateLocation>, ConvertError> {
        (**self).fetch_state_locations()
    }
}

/// In-memory source, mostly useful for tests and for re-running a snapshot.
impl StateSource for Vec<StateLocation> {
    fn fetch_state_locations(&mut self) -> Result<Vec<StateLocation>, ConvertError> {
        Ok(self.clone())
    }
}

/// Opens the source selected by `config`.
pub fn open_source(config: &SourceConfig) -> Result<Box<dyn StateSource>, ConvertError> {
    match config.kind {
        SourceKind::Sqlite => {
            let path = config.sqlite.path.as_ref().ok_or_else(|| {
                ConvertError::Config(eyre::eyre!("SQLite source selected but no path configured"))
            })?;
            info!(path = %path.display(), "Reading debug data from SQLite snapshot");
            Ok(Box::new(SqliteSource::open(path, config.query())?))
        }
        SourceKind::Mysql => open_mysql(config),
    }
}

#[cfg(feature = "mysql")]
fn open_mysql(config: &SourceConfig) -> Result<Box<dyn StateSource>, ConvertError> {
    let mysql = &config.mysql;
    info!(
        host = %mysql.host,
        port = mysql.port,
        database = %mysql.database,
        "Reading debug data from MySQL"
    );
    Ok(Box::new(MysqlSource::connect(mysql, config.query())?))
}

#[cfg(not(feature = "mysql"))]
fn open_mysql(_config: &SourceConfig) -> Result<Box<dyn StateSource>, ConvertError> {
    Err(ConvertError::SourceUnavailable(eyre::eyre!(
        "built without MySQL support; rebuild with `--features mysql` or read a SQLite snapshot"
    )))
}

/// Positions of the required columns in a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnLayout {
    pub(crate) state_id: usize,
    pub(crate) filename: usize,
    pub(crate) line_number: usize,
}

impl ColumnLayout {
    /// Locates the required columns by name, ignoring ASCII case.
    pub(crate) fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Self, ConvertError> {
        let found: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        let find = |wanted: &str| found.iter().position(|n| n.eq_ignore_ascii_case(wanted));

        let (Some(state_id), Some(filename), Some(line_number)) =
            (find("state_id"), find("filename"), find("line_number"))
        else {
            let missing: Vec<&str> =
                REQUIRED_COLUMNS.into_iter().filter(|&c| find(c).is_none()).collect();
            return Err(ConvertError::SchemaMismatch(format!(
                "missing column(s) {} in query result (got: {})",
                missing.join(", "),
                found.join(", ")
            )));
        };

        Ok(Self { state_id, filename, line_number })
    }
}

/// A NULL where a state id was expected.
pub(crate) fn null_state_id(index: usize) -> ConvertError {
    ConvertError::SchemaMismatch(format!("state_id is NULL in row {index}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_layout_any_order_and_case() {
        let layout = ColumnLayout::resolve(&["LINE_NUMBER", "extra", "FileName", "state_id"])
            .unwrap();
        assert_eq!(layout, ColumnLayout { state_id: 3, filename: 2, line_number: 0 });
    }

    #[test]
    fn test_column_layout_reports_missing() {
        let err = ColumnLayout::resolve(&["state_id", "file"]).unwrap_err();
        match err {
            ConvertError::SchemaMismatch(msg) => {
                assert!(msg.contains("filename, line_number"), "{msg}");
                assert!(msg.contains("got: state_id, file"), "{msg}");
            }
            other => panic!("Expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_vec_source_preserves_order() {
        let mut source = vec![
            StateLocation::new(2, "b.c", 1),
            StateLocation::new(1, "a.c", 1),
        ];
        let rows = source.fetch_state_locations().unwrap();
        assert_eq!(rows[0].state_id, 2);
        assert_eq!(rows[1].state_id, 1);
    }

    #[test]
    fn test_open_sqlite_without_path() {
        let config = SourceConfig { kind: SourceKind::Sqlite, ..Default::default() };
        let err = open_source(&config).err().unwrap();
        assert!(matches!(err, ConvertError::Config(_)));
    }

    #[cfg(not(feature = "mysql"))]
    #[test]
    fn test_mysql_unavailable_without_feature() {
        let err = open_source(&SourceConfig::default()).err().unwrap();
        assert!(matches!(err, ConvertError::SourceUnavailable(_)));
    }
}
