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

use crate::{InvalidReason, StateLocation};

/// Default number of invalid records kept as examples in a [`SkipReport`].
pub const DEFAULT_MAX_REPORTED_EXAMPLES: usize = 5;

/// A state location that was rejected during synthesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvalidRecord {
    /// Position of the record in the extracted sequence.
    pub index: usize,
    /// The record as extracted.
    pub location: StateLocation,
    /// Why it was rejected.
    pub reason: InvalidReason,
}

impl Display for InvalidRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} ({}): {}", self.index, self.location, self.reason)
    }
}

/// Summary of the invalid records skipped during one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkipReport {
    /// Total number of skipped records.
    pub count: usize,
    /// The first few skipped records, in input order.
    pub examples: Vec<InvalidRecord>,
}

impl SkipReport {
    /// Records a skipped entry, keeping it as an example while there is room.
    pub fn record(&mut self, record: InvalidRecord, max_examples: usize) {
        self.count += 1;
        if self.examples.len() < max_examples {
            self.examples.push(record);
        }
    }

    /// Whether nothing was skipped.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
