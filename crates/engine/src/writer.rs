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

//! hgdb debug database output.
//!
//! hgdb reads breakpoints from a table named `breakpoint` with the columns
//! `filename`, `line_num` and `condition`. The names are part of hgdb's
//! schema and must not change.

use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{eyre, WrapErr};
use hgdb_legup_common::{Breakpoint, ConvertError};
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

/// DDL for hgdb's breakpoint table.
pub const BREAKPOINT_TABLE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS breakpoint (\
filename TEXT NOT NULL, \
line_num INTEGER NOT NULL, \
condition TEXT NOT NULL)";

const INSERT_BREAKPOINT: &str =
    "INSERT INTO breakpoint (filename, line_num, condition) VALUES (?1, ?2, ?3)";

/// Writes breakpoints into a fresh hgdb debug database.
#[derive(Debug)]
pub struct BreakpointWriter {
    conn: Connection,
    path: PathBuf,
}

impl BreakpointWriter {
    /// Creates the database at `path` with an empty breakpoint table.
    ///
    /// An existing file is only replaced when `overwrite` is set.
    pub fn create(path: impl AsRef<Path>, overwrite: bool) -> Result<Self, ConvertError> {
        Self::create_with_schema(path.as_ref(), overwrite, BREAKPOINT_TABLE_SCHEMA)
    }

    fn create_with_schema(
        path: &Path,
        overwrite: bool,
        schema: &str,
    ) -> Result<Self, ConvertError> {
        if path.exists() {
            if !overwrite {
                return Err(ConvertError::Output(eyre!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "Removing existing debug database");
            fs::remove_file(path)
                .wrap_err_with(|| format!("cannot remove {}", path.display()))
                .map_err(ConvertError::Output)?;
        }

        let conn = Connection::open(path)
            .wrap_err_with(|| format!("cannot create {}", path.display()))
            .map_err(ConvertError::Output)?;
        if let Err(err) = conn.execute_batch(schema) {
            drop(conn);
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "Cannot remove partial output");
                }
            }
            return Err(ConvertError::Output(
                eyre::Report::new(err).wrap_err("cannot create breakpoint table"),
            ));
        }

        Ok(Self { conn, path: path.to_path_buf() })
    }

    /// Path of the database being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts `breakpoints` in order, in a single transaction.
    pub fn write(&mut self, breakpoints: &[Breakpoint]) -> Result<usize, ConvertError> {
        self.insert_all(breakpoints).map_err(ConvertError::Output)?;
        info!(
            path = %self.path.display(),
            breakpoints = breakpoints.len(),
            "Wrote breakpoint table"
        );
        Ok(breakpoints.len())
    }

    fn insert_all(&mut self, breakpoints: &[Breakpoint]) -> eyre::Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_BREAKPOINT)?;
            for bp in breakpoints {
                stmt.execute(params![bp.filename, bp.line_number, bp.condition])
                    .wrap_err_with(|| format!("cannot insert breakpoint {bp}"))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
