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

use crate::{SourceLocation, StateCondition};

/// A source-level breakpoint as stored in hgdb's `breakpoint` table.
///
/// The condition must evaluate true exactly when the hardware FSM is in one
/// of the states that LegUp mapped to this source line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Breakpoint {
    /// Path to the source file.
    pub filename: String,
    /// Line number in the source file (1-based).
    pub line_number: u32,
    /// Fire condition over the current FSM state.
    pub condition: String,
}

impl Breakpoint {
    /// Creates a breakpoint at `loc` guarded by `condition`.
    ///
    /// Returns `None` if the condition holds no state, since hgdb would treat
    /// an empty condition as "always fire".
    pub fn new(loc: SourceLocation, condition: &StateCondition) -> Option<Self> {
        let condition = condition.render()?;
        Some(Self { filename: loc.filename, line_number: loc.line_number, condition })
    }

    /// Returns the source location of this breakpoint.
    pub fn location(&self) -> SourceLocation {
        SourceLocation { filename: self.filename.clone(), line_number: self.line_number }
    }
}

impl Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}:{} if {}", self.filename, self.line_number, self.condition)
    }
}
