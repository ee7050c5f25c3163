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

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One (state, statement) association recorded by the HLS compiler.
///
/// Records come straight out of the debug database and are not validated;
/// a NULL filename is kept as `None` so the synthesizer can report it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StateLocation {
    /// FSM state identifier, unique within a design.
    pub state_id: i64,
    /// Absolute path of the source file, if the database recorded one.
    pub filename: Option<String>,
    /// Line number in the source file (1-based when valid).
    pub line_number: i64,
}

impl StateLocation {
    /// Creates a new state location.
    pub fn new(state_id: i64, filename: impl Into<String>, line_number: i64) -> Self {
        Self { state_id, filename: Some(filename.into()), line_number }
    }

    /// Validates the record and returns the source location it maps to.
    pub fn source_location(&self) -> Result<SourceLocation, InvalidReason> {
        SourceLocation::try_from(self)
    }
}

impl Display for StateLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filename = self.filename.as_deref().unwrap_or("<null>");
        write!(f, "state {} @ {filename}:{}", self.state_id, self.line_number)
    }
}

/// Why a [`StateLocation`] cannot be turned into a [`SourceLocation`].
#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    /// The filename is NULL or empty.
    #[error("filename is empty")]
    EmptyFilename,
    /// The line number is zero or negative.
    #[error("line number {0} is not positive")]
    NonPositiveLine(i64),
    /// The line number does not fit the output column.
    #[error("line number {0} is out of range")]
    LineOutOfRange(i64),
}

/// A validated `(filename, line_number)` pair, the grouping key for breakpoints.
///
/// Equality is exact: filenames are compared as strings, no path normalization
/// happens here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceLocation {
    /// Path to the source file.
    pub filename: String,
    /// Line number in the source file (1-based).
    pub line_number: u32,
}

impl TryFrom<&StateLocation> for SourceLocation {
    type Error = InvalidReason;

    fn try_from(loc: &StateLocation) -> Result<Self, Self::Error> {
        let filename = match loc.filename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(InvalidReason::EmptyFilename),
        };
        if loc.line_number <= 0 {
            return Err(InvalidReason::NonPositiveLine(loc.line_number));
        }
        let line_number = u32::try_from(loc.line_number)
            .map_err(|_| InvalidReason::LineOutOfRange(loc.line_number))?;

        Ok(Self { filename: filename.to_string(), line_number })
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.filename, self.line_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_from_valid_record() {
        let loc = StateLocation::new(3, "/legup/examples/qsort.c", 11);
        let src = loc.source_location().unwrap();
        assert_eq!(src.filename, "/legup/examples/qsort.c");
        assert_eq!(src.line_number, 11);
        assert_eq!(src.to_string(), "/legup/examples/qsort.c:11");
    }

    #[test]
    fn test_source_location_rejects_empty_filename() {
        let loc = StateLocation::new(1, "", 10);
        assert_eq!(loc.source_location(), Err(InvalidReason::EmptyFilename));

        let loc = StateLocation { state_id: 1, filename: None, line_number: 10 };
        assert_eq!(loc.source_location(), Err(InvalidReason::EmptyFilename));
    }

    #[test]
    fn test_source_location_rejects_bad_lines() {
        let loc = StateLocation::new(1, "a.c", 0);
        assert_eq!(loc.source_location(), Err(InvalidReason::NonPositiveLine(0)));

        let loc = StateLocation::new(1, "a.c", -4);
        assert_eq!(loc.source_location(), Err(InvalidReason::NonPositiveLine(-4)));

        let too_big = i64::from(u32::MAX) + 1;
        let loc = StateLocation::new(1, "a.c", too_big);
        assert_eq!(loc.source_location(), Err(InvalidReason::LineOutOfRange(too_big)));
    }

    #[test]
    fn test_source_location_is_case_sensitive() {
        let upper = StateLocation::new(1, "A.c", 1).source_location().unwrap();
        let lower = StateLocation::new(1, "a.c", 1).source_location().unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_state_location_display() {
        let loc = StateLocation { state_id: 7, filename: None, line_number: 2 };
        assert_eq!(loc.to_string(), "state 7 @ <null>:2");
    }
}
