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

use std::time::Duration;

use eyre::WrapErr;
use hgdb_legup_common::{ConvertError, StateLocation};
use mysql::{prelude::Queryable, Conn, OptsBuilder, Row, Value};
use tracing::debug;

use super::{null_state_id, ColumnLayout, StateSource};
use crate::MysqlConfig;

/// Reads state locations from the LegUp debug database over MySQL.
pub struct MysqlSource {
    conn: Conn,
    query: String,
}

impl MysqlSource {
    /// Connects to the server described by `config`.
    pub fn connect(config: &MysqlConfig, query: impl Into<String>) -> Result<Self, ConvertError> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.as_str()))
            .tcp_port(config.port)
            .user(Some(config.user.as_str()))
            .pass(Some(config.password.as_str()))
            .db_name(Some(config.database.as_str()))
            .tcp_connect_timeout(config.connect_timeout_secs.map(Duration::from_secs));

        let conn = Conn::new(opts)
            .wrap_err_with(|| {
                format!(
                    "cannot connect to {}@{}:{}/{}",
                    config.user, config.host, config.port, config.database
                )
            })
            .map_err(ConvertError::SourceUnavailable)?;

        Ok(Self { conn, query: query.into() })
    }
}

impl StateSource for MysqlSource {
    fn fetch_state_locations(&mut self) -> Result<Vec<StateLocation>, ConvertError> {
        let mut result = self.conn.query_iter(self.query.as_str()).map_err(classify)?;

        let names: Vec<String> =
            result.columns().as_ref().iter().map(|c| c.name_str().into_owned()).collect();
        let layout = ColumnLayout::resolve(&names)?;

        let mut locations = Vec::new();
        for row in result.by_ref() {
            let row = row.map_err(classify)?;
            let index = locations.len();
            let state_id: Option<i64> = column(&row, layout.state_id, index)?;
            let state_id = state_id.ok_or_else(|| null_state_id(index))?;
            let filename: Option<String> = column(&row, layout.filename, index)?;
            let line_number: Option<i64> = column(&row, layout.line_number, index)?;

            locations.push(StateLocation {
                state_id,
                filename,
                line_number: line_number.unwrap_or_default(),
            });
        }

        debug!(rows = locations.len(), "Extracted state locations from MySQL");
        Ok(locations)
    }
}

fn column<T: mysql::prelude::FromValue>(
    row: &Row,
    idx: usize,
    index: usize,
) -> Result<Option<T>, ConvertError> {
    match row.as_ref(idx) {
        None | Some(Value::NULL) => Ok(None),
        Some(value) => mysql::from_value_opt::<T>(value.clone()).map(Some).map_err(|e| {
            ConvertError::SchemaMismatch(format!("unexpected value in row {index}: {e}"))
        }),
    }
}

/// Server-side errors (unknown table, unknown column, syntax) mean the query
/// does not fit the database; everything else means we could not read it.
fn classify(err: mysql::Error) -> ConvertError {
    match err {
        mysql::Error::MySqlError(e) => ConvertError::SchemaMismatch(e.to_string()),
        other => ConvertError::SourceUnavailable(other.into()),
    }
}
