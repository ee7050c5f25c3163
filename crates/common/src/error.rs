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

use thiserror::Error;

use crate::{InvalidReason, StateLocation};

/// Errors that can occur while converting LegUp debug data.
///
/// Everything except [`ConvertError::InvalidLocation`] aborts the run. An
/// invalid location only aborts it when the synthesizer runs in strict mode;
/// otherwise it is counted and skipped.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The debug database could not be reached
    #[error("debug data source is unavailable: {0}")]
    SourceUnavailable(eyre::Report),

    /// The debug database does not have the expected shape
    #[error("debug data source has an unexpected schema: {0}")]
    SchemaMismatch(String),

    /// A single malformed state location
    #[error("invalid state location #{index} ({location}): {reason}")]
    InvalidLocation {
        /// Position of the record in the extracted sequence
        index: usize,
        /// The offending record
        location: StateLocation,
        /// Why the record was rejected
        reason: InvalidReason,
    },

    /// An invariant of the synthesizer was violated
    #[error("internal error: {0}")]
    Internal(String),

    /// The output database could not be written
    #[error("failed to write debug database: {0}")]
    Output(eyre::Report),

    /// The configuration could not be loaded
    #[error("invalid configuration: {0}")]
    Config(eyre::Report),
}

impl ConvertError {
    /// Whether this error aborts a run regardless of the invalid-record policy.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidLocation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let invalid = ConvertError::InvalidLocation {
            index: 0,
            location: StateLocation::new(1, "a.c", 0),
            reason: InvalidReason::NonPositiveLine(0),
        };
        assert!(!invalid.is_fatal());

        assert!(ConvertError::SchemaMismatch("missing column".into()).is_fatal());
        assert!(ConvertError::Internal("empty group".into()).is_fatal());
        assert!(ConvertError::SourceUnavailable(eyre::eyre!("refused")).is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = ConvertError::InvalidLocation {
            index: 4,
            location: StateLocation::new(2, "a.c", 0),
            reason: InvalidReason::NonPositiveLine(0),
        };
        assert_eq!(
            err.to_string(),
            "invalid state location #4 (state 2 @ a.c:0): line number 0 is not positive"
        );

        let err = ConvertError::SourceUnavailable(eyre::eyre!("connection refused"));
        assert_eq!(err.to_string(), "debug data source is unavailable: connection refused");
    }
}
