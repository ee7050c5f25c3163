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

//! Breakpoint synthesis.
//!
//! LegUp maps each FSM state to the statements it executes, so one source line
//! typically shows up under several states. hgdb wants the opposite view: one
//! breakpoint per line, firing whenever the FSM sits in any of those states.
//!
//! Grouping is keyed on the exact `(filename, line_number)` pair. Breakpoints
//! are emitted in the order their location first appears in the input, which
//! keeps them close to statement order and makes runs easy to diff.

use hgdb_legup_common::{
    Breakpoint, ConvertError, InvalidRecord, SkipReport, SourceLocation, StateCondition,
    StateLocation, DEFAULT_MAX_REPORTED_EXAMPLES,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do with a state location that has no usable source position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidRecordPolicy {
    /// Skip the record, count it and keep going
    #[default]
    Skip,
    /// Fail the whole run
    Abort,
}

/// Result of one synthesis pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Synthesis {
    /// One breakpoint per distinct source location, in first-occurrence order
    pub breakpoints: Vec<Breakpoint>,
    /// Records that were skipped
    pub skipped: SkipReport,
}

/// Groups state locations into breakpoints.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer {
    policy: InvalidRecordPolicy,
    max_examples: usize,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(InvalidRecordPolicy::default())
    }
}

impl Synthesizer {
    /// Creates a synthesizer with the given invalid-record policy.
    pub fn new(policy: InvalidRecordPolicy) -> Self {
        Self { policy, max_examples: DEFAULT_MAX_REPORTED_EXAMPLES }
    }

    /// Sets how many skipped records are kept as examples.
    pub fn with_max_examples(mut self, max_examples: usize) -> Self {
        self.max_examples = max_examples;
        self
    }

    /// The invalid-record policy in use.
    pub fn policy(&self) -> InvalidRecordPolicy {
        self.policy
    }

    /// Builds one breakpoint per distinct source location in `locations`.
    pub fn synthesize(&self, locations: &[StateLocation]) -> Result<Synthesis, ConvertError> {
        let mut groups: IndexMap<SourceLocation, StateCondition> = IndexMap::new();
        let mut skipped = SkipReport::default();

        for (index, location) in locations.iter().enumerate() {
            let key = match location.source_location() {
                Ok(key) => key,
                Err(reason) => match self.policy {
                    InvalidRecordPolicy::Abort => {
                        return Err(ConvertError::InvalidLocation {
                            index,
                            location: location.clone(),
                            reason,
                        });
                    }
                    InvalidRecordPolicy::Skip => {
                        warn!(index, %location, %reason, "Skipping invalid state location");
                        let record = InvalidRecord { index, location: location.clone(), reason };
                        skipped.record(record, self.max_examples);
                        continue;
                    }
                },
            };

            groups.entry(key).or_default().insert(location.state_id);
        }

        let breakpoints = emit_breakpoints(groups)?;
        debug!(
            records = locations.len(),
            breakpoints = breakpoints.len(),
            skipped = skipped.count,
            "Synthesized breakpoints"
        );

        Ok(Synthesis { breakpoints, skipped })
    }
}

/// Synthesizes breakpoints with the default skip-and-continue policy.
pub fn synthesize(locations: &[StateLocation]) -> Result<Synthesis, ConvertError> {
    Synthesizer::default().synthesize(locations)
}

fn emit_breakpoints(
    groups: IndexMap<SourceLocation, StateCondition>,
) -> Result<Vec<Breakpoint>, ConvertError> {
    groups
        .into_iter()
        .map(|(loc, condition)| {
            let at = loc.to_string();
            Breakpoint::new(loc, &condition)
                .ok_or_else(|| ConvertError::Internal(format!("no state recorded for {at}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use super::*;
    use hgdb_legup_common::InvalidReason;

    fn loc(state_id: i64, filename: &str, line_number: i64) -> StateLocation {
        StateLocation::new(state_id, filename, line_number)
    }

    fn states_in(condition: &str) -> Vec<i64> {
        condition
            .split(" || ")
            .map(|clause| clause.strip_prefix("cur_state == ").unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn test_qsort_style_scenario() {
        let input = vec![
            loc(1, "a.c", 10),
            loc(2, "a.c", 10),
            loc(3, "b.c", 20),
            loc(4, "a.c", 10),
            loc(5, "a.c", 10),
            loc(6, "a.c", 10),
        ];
        let out = synthesize(&input).unwrap();

        assert_eq!(out.breakpoints.len(), 2);
        assert_eq!(out.breakpoints[0].filename, "a.c");
        assert_eq!(out.breakpoints[0].line_number, 10);
        assert_eq!(
            out.breakpoints[0].condition,
            "cur_state == 1 || cur_state == 2 || cur_state == 4 || cur_state == 5 || cur_state == 6"
        );
        assert_eq!(out.breakpoints[1].filename, "b.c");
        assert_eq!(out.breakpoints[1].line_number, 20);
        assert_eq!(out.breakpoints[1].condition, "cur_state == 3");
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let out = synthesize(&[]).unwrap();
        assert!(out.breakpoints.is_empty());
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn test_single_state_collapse() {
        let out = synthesize(&[loc(7, "main.c", 3)]).unwrap();
        assert_eq!(out.breakpoints[0].condition, "cur_state == 7");
        assert!(!out.breakpoints[0].condition.contains("||"));
    }

    #[test]
    fn test_repeated_states_collapse() {
        let input = vec![loc(4, "a.c", 1), loc(2, "a.c", 1), loc(4, "a.c", 1), loc(2, "a.c", 1)];
        let out = synthesize(&input).unwrap();
        assert_eq!(out.breakpoints.len(), 1);
        assert_eq!(out.breakpoints[0].condition, "cur_state == 2 || cur_state == 4");
    }

    #[test]
    fn test_first_occurrence_order() {
        let input = vec![
            loc(1, "z.c", 99),
            loc(2, "a.c", 1),
            loc(3, "z.c", 99),
            loc(4, "m.c", 5),
            loc(5, "a.c", 1),
        ];
        let out = synthesize(&input).unwrap();
        let order: Vec<String> = out.breakpoints.iter().map(|bp| bp.location().to_string()).collect();
        assert_eq!(order, vec!["z.c:99", "a.c:1", "m.c:5"]);
    }

    #[test]
    fn test_grouping_is_exact() {
        let input = vec![
            loc(1, "a.c", 1),
            loc(2, "A.c", 1),
            loc(3, "./a.c", 1),
            loc(4, "a.c", 2),
        ];
        let out = synthesize(&input).unwrap();
        assert_eq!(out.breakpoints.len(), 4);
        assert!(out.breakpoints.iter().all(|bp| states_in(&bp.condition).len() == 1));
    }

    #[test]
    fn test_state_shared_by_lines() {
        // One state executing two statements yields two breakpoints.
        let input = vec![loc(1, "a.c", 1), loc(1, "a.c", 2)];
        let out = synthesize(&input).unwrap();
        assert_eq!(out.breakpoints.len(), 2);
        assert_eq!(out.breakpoints[0].condition, "cur_state == 1");
        assert_eq!(out.breakpoints[1].condition, "cur_state == 1");
    }

    #[test]
    fn test_invalid_record_is_skipped() {
        let input = vec![
            loc(1, "a.c", 10),
            loc(2, "a.c", 0),
            loc(3, "b.c", 20),
            StateLocation { state_id: 4, filename: None, line_number: 10 },
            loc(5, "a.c", 10),
        ];
        let out = synthesize(&input).unwrap();

        assert_eq!(out.breakpoints.len(), 2);
        assert_eq!(out.breakpoints[0].condition, "cur_state == 1 || cur_state == 5");
        assert_eq!(out.breakpoints[1].condition, "cur_state == 3");

        assert_eq!(out.skipped.count, 2);
        assert_eq!(out.skipped.examples[0].index, 1);
        assert_eq!(out.skipped.examples[0].reason, InvalidReason::NonPositiveLine(0));
        assert_eq!(out.skipped.examples[1].index, 3);
        assert_eq!(out.skipped.examples[1].reason, InvalidReason::EmptyFilename);
    }

    #[test]
    fn test_invalid_record_does_not_disturb_others() {
        let valid = vec![loc(1, "a.c", 10), loc(2, "b.c", 20), loc(3, "a.c", 10)];
        let mut noisy = valid.clone();
        noisy.insert(1, loc(9, "a.c", -3));

        let clean = synthesize(&valid).unwrap();
        let dirty = synthesize(&noisy).unwrap();
        assert_eq!(clean.breakpoints, dirty.breakpoints);
        assert_eq!(dirty.skipped.count, 1);
    }

    #[test]
    fn test_strict_policy_aborts() {
        let input = vec![loc(1, "a.c", 10), loc(2, "", 10)];
        let synthesizer = Synthesizer::new(InvalidRecordPolicy::Abort);
        assert_eq!(synthesizer.policy(), InvalidRecordPolicy::Abort);
        assert_eq!(Synthesizer::default().policy(), InvalidRecordPolicy::Skip);

        let err = synthesizer.synthesize(&input).unwrap_err();

        match err {
            ConvertError::InvalidLocation { index, location, reason } => {
                assert_eq!(index, 1);
                assert_eq!(location.state_id, 2);
                assert_eq!(reason, InvalidReason::EmptyFilename);
            }
            other => panic!("Expected InvalidLocation, got {other:?}"),
        }
    }

    #[test]
    fn test_skip_examples_are_capped() {
        let input: Vec<_> = (0..10).map(|i| loc(i, "a.c", 0)).collect();
        let out = Synthesizer::default().with_max_examples(3).synthesize(&input).unwrap();
        assert!(out.breakpoints.is_empty());
        assert_eq!(out.skipped.count, 10);
        assert_eq!(out.skipped.examples.len(), 3);
    }

    #[test]
    fn test_deterministic_under_permutation() {
        let input = vec![
            loc(5, "a.c", 1),
            loc(3, "a.c", 1),
            loc(9, "b.c", 2),
            loc(1, "a.c", 1),
            loc(7, "b.c", 2),
        ];
        let mut reversed = input.clone();
        reversed.reverse();

        let first = synthesize(&input).unwrap();
        let again = synthesize(&input).unwrap();
        assert_eq!(first, again);

        // Conditions do not depend on input order, only the breakpoint order does.
        let mut lhs: Vec<_> = first.breakpoints.clone();
        let mut rhs: Vec<_> = synthesize(&reversed).unwrap().breakpoints;
        lhs.sort_by_key(|bp| bp.location());
        rhs.sort_by_key(|bp| bp.location());
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_condition_matches_input_states() {
        let input: Vec<_> = (0..200)
            .map(|i: i64| loc((i * 7919) % 61, &format!("f{}.c", i % 3), 1 + (i % 11)))
            .collect();
        let out = synthesize(&input).unwrap();

        let expected_locations: HashSet<_> =
            input.iter().map(|l| l.source_location().unwrap()).collect();
        let actual_locations: HashSet<_> = out.breakpoints.iter().map(|bp| bp.location()).collect();
        assert_eq!(expected_locations, actual_locations);
        assert_eq!(out.breakpoints.len(), actual_locations.len());

        for bp in &out.breakpoints {
            let expected: BTreeSet<i64> = input
                .iter()
                .filter(|l| l.source_location().unwrap() == bp.location())
                .map(|l| l.state_id)
                .collect();
            let actual = states_in(&bp.condition);
            assert_eq!(actual, expected.into_iter().collect::<Vec<_>>(), "{bp}");
        }
    }

    #[test]
    fn test_empty_group_is_internal_error() {
        let mut groups = IndexMap::new();
        groups.insert(
            SourceLocation { filename: "a.c".into(), line_number: 1 },
            StateCondition::new(),
        );
        let err = emit_breakpoints(groups).unwrap_err();
        assert!(matches!(err, ConvertError::Internal(_)));
        assert!(err.to_string().contains("a.c:1"));
    }
}
