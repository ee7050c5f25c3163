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

//! Test utilities for building LegUp-shaped debug databases.
//!
//! The fixture mirrors the tables the default extraction query joins
//! (`IRInstr`, `State`, `HLStatement`) in a SQLite file, so the whole pipeline
//! can be exercised without a MySQL server.

use std::{collections::HashMap, path::Path};

use eyre::Result;
use rusqlite::{params, Connection};
use tracing::info;

/// Source file of LegUp's labeled quicksort debug example.
pub const QSORT_SOURCE: &str = "/legup/examples/debug/qsort/qsort_labeled.c";

const LEGUP_SCHEMA: &str = "
CREATE TABLE Function (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
CREATE TABLE State (
    id INTEGER PRIMARY KEY,
    functionId INTEGER REFERENCES Function(id),
    number INTEGER
);
CREATE TABLE HLStatement (
    id INTEGER PRIMARY KEY,
    file_name TEXT,
    line_number INTEGER,
    column_number INTEGER
);
CREATE TABLE IRInstr (
    id INTEGER PRIMARY KEY,
    functionId INTEGER REFERENCES Function(id),
    numInFunction INTEGER,
    startStateId INTEGER REFERENCES State(id),
    endStateId INTEGER REFERENCES State(id),
    hlStatementId INTEGER REFERENCES HLStatement(id)
);
";

/// Rows of the quicksort example as `(state, file, line)`, in instruction order.
///
/// Line 11 spans states 1 to 5, the remaining lines are spread over later
/// states, and a few states execute more than one statement.
pub fn qsort_rows() -> Vec<(i64, &'static str, i64)> {
    let mut rows: Vec<(i64, &'static str, i64)> =
        (1..=5).map(|state| (state, QSORT_SOURCE, 11)).collect();
    rows.extend([
        (6, QSORT_SOURCE, 12),
        (6, QSORT_SOURCE, 13),
        (7, QSORT_SOURCE, 14),
        (8, QSORT_SOURCE, 14),
        (9, QSORT_SOURCE, 16),
        (10, QSORT_SOURCE, 17),
        (10, QSORT_SOURCE, 18),
        (11, QSORT_SOURCE, 20),
        (12, QSORT_SOURCE, 21),
        (13, QSORT_SOURCE, 23),
        (14, QSORT_SOURCE, 24),
        (15, QSORT_SOURCE, 26),
        (16, QSORT_SOURCE, 27),
        (3, QSORT_SOURCE, 11),
    ]);
    rows
}

/// Creates a LegUp-shaped SQLite database at `path` holding `rows`.
///
/// Every row becomes one IR instruction; states and statements are shared
/// between rows that name the same state number or the same file and line.
pub fn create_legup_database(
    path: impl AsRef<Path>,
    rows: &[(i64, Option<&str>, i64)],
) -> Result<()> {
    let mut conn = Connection::open(path.as_ref())?;
    conn.execute_batch(LEGUP_SCHEMA)?;

    let tx = conn.transaction()?;
    tx.execute("INSERT INTO Function (id, name) VALUES (1, 'main')", [])?;

    let mut states: HashMap<i64, i64> = HashMap::new();
    let mut statements: HashMap<(Option<&str>, i64), i64> = HashMap::new();
    for (instr, &(state, file, line)) in rows.iter().enumerate() {
        let next_state = states.len() as i64 + 1;
        let state_key = *states.entry(state).or_insert_with(|| next_state);
        if state_key == next_state {
            tx.execute(
                "INSERT INTO State (id, functionId, number) VALUES (?1, 1, ?2)",
                params![state_key, state],
            )?;
        }

        let next_statement = statements.len() as i64 + 1;
        let statement_key = *statements.entry((file, line)).or_insert_with(|| next_statement);
        if statement_key == next_statement {
            tx.execute(
                "INSERT INTO HLStatement (id, file_name, line_number, column_number) \
                 VALUES (?1, ?2, ?3, 1)",
                params![statement_key, file, line],
            )?;
        }

        tx.execute(
            "INSERT INTO IRInstr (id, functionId, numInFunction, startStateId, endStateId, \
             hlStatementId) VALUES (?1, 1, ?1, ?2, ?2, ?3)",
            params![instr as i64 + 1, state_key, statement_key],
        )?;
    }
    tx.commit()?;

    info!(path = %path.as_ref().display(), rows = rows.len(), "Created LegUp fixture database");
    Ok(())
}

/// Creates the quicksort fixture at `path`.
pub fn create_qsort_database(path: impl AsRef<Path>) -> Result<()> {
    let rows: Vec<_> =
        qsort_rows().into_iter().map(|(state, file, line)| (state, Some(file), line)).collect();
    create_legup_database(path, &rows)
}
