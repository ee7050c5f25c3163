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

//! Fire conditions over the live FSM state.
//!
//! hgdb evaluates a breakpoint's condition against the running design. For
//! LegUp output the only signal we key on is the current FSM state, so every
//! condition is a disjunction of equality tests:
//!
//! ```text
//! cur_state == 1 || cur_state == 4 || cur_state == 9
//! ```

use std::{collections::BTreeSet, fmt::Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Name of the FSM state variable recognized by hgdb.
pub const CUR_STATE: &str = "cur_state";

/// Connective placed between two clauses.
pub const OR_CONNECTIVE: &str = " || ";

/// The set of FSM states under which a source line is considered reached.
///
/// States are kept sorted and unique, so the rendered condition is stable
/// across runs regardless of the order the states were observed in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StateCondition {
    states: BTreeSet<i64>,
}

impl StateCondition {
    /// Creates an empty condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state. Returns `false` if it was already present.
    pub fn insert(&mut self, state_id: i64) -> bool {
        self.states.insert(state_id)
    }

    /// Whether no state has been added yet.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of distinct states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// States in ascending order.
    pub fn states(&self) -> impl Iterator<Item = i64> + '_ {
        self.states.iter().copied()
    }

    /// Renders the condition string, or `None` for an empty set.
    pub fn render(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl FromIterator<i64> for StateCondition {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self { states: iter.into_iter().collect() }
    }
}

impl Display for StateCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clauses = self.states.iter().format_with(OR_CONNECTIVE, |state, g| {
            g(&format_args!("{CUR_STATE} == {state}"))
        });
        write!(f, "{clauses}")
    }
}
