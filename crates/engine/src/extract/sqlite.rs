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

use std::path::Path;

use eyre::WrapErr;
use hgdb_legup_common::{ConvertError, StateLocation};
use rusqlite::{Connection, ErrorCode, OpenFlags};
use tracing::debug;

use super::{null_state_id, ColumnLayout, StateSource};

/// Reads state locations from a SQLite database.
///
/// The database is opened read-only; it is never created or modified.
#[derive(Debug)]
pub struct SqliteSource {
    conn: Connection,
    query: String,
}

impl SqliteSource {
    /// Opens the database at `path` and prepares to run `query` against it.
    pub fn open(path: impl AsRef<Path>, query: impl Into<String>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .wrap_err_with(|| format!("cannot open {}", path.display()))
        .map_err(ConvertError::SourceUnavailable)?;

        Ok(Self::from_connection(conn, query))
    }

    /// Wraps an already open connection.
    pub fn from_connection(conn: Connection, query: impl Into<String>) -> Self {
        Self { conn, query: query.into() }
    }
}

impl StateSource for SqliteSource {
    fn fetch_state_locations(&mut self) -> Result<Vec<StateLocation>, ConvertError> {
        let mut stmt = self.conn.prepare(&self.query).map_err(classify)?;

        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let layout = ColumnLayout::resolve(&names)?;

        let mut rows = stmt.query([]).map_err(classify)?;
        let mut locations = Vec::new();
        while let Some(row) = rows.next().map_err(classify)? {
            let index = locations.len();
            let state_id: Option<i64> = row.get(layout.state_id).map_err(classify)?;
            let state_id = state_id.ok_or_else(|| null_state_id(index))?;
            let filename: Option<String> = row.get(layout.filename).map_err(classify)?;
            let line_number: Option<i64> = row.get(layout.line_number).map_err(classify)?;

            locations.push(StateLocation {
                state_id,
                filename,
                line_number: line_number.unwrap_or_default(),
            });
        }

        debug!(rows = locations.len(), "Extracted state locations from SQLite");
        Ok(locations)
    }
}

/// Splits SQLite failures into "cannot read" and "does not look like LegUp data".
fn classify(err: rusqlite::Error) -> ConvertError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(
                e.code,
                ErrorCode::CannotOpen
                    | ErrorCode::NotADatabase
                    | ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::DatabaseCorrupt
            ) =>
        {
            ConvertError::SourceUnavailable(err.into())
        }
        _ => ConvertError::SchemaMismatch(err.to_string()),
    }
}
