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

//! Conversion driver.
//!
//! [`Converter`] wires extraction, synthesis and writing together. Everything
//! that can fail on the input side runs before the output file is touched, so
//! a fatal error never leaves a half-built debug database behind.

use std::{fmt, fs, path::Path};

use hgdb_legup_common::{Breakpoint, ConvertError, SkipReport};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{open_source, BreakpointWriter, ConvertConfig, StateSource, Synthesizer};

/// Breakpoints produced from one source, before anything is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversion {
    /// Number of state locations read from the source
    pub extracted: usize,
    /// One breakpoint per distinct source location
    pub breakpoints: Vec<Breakpoint>,
    /// Records that were skipped
    pub skipped: SkipReport,
}

impl Conversion {
    /// Renders the conversion as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConvertError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConvertError::Internal(format!("cannot serialize conversion: {e}")))
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversionReport {
    /// Number of state locations read from the source
    pub extracted: usize,
    /// Number of breakpoint rows written
    pub written: usize,
    /// Records that were skipped
    pub skipped: SkipReport,
}

impl ConversionReport {
    /// Classifies the run for the final summary line.
    pub fn outcome(&self) -> Outcome {
        match (self.written, self.skipped.count) {
            (0, skipped) => Outcome::NoDebugData { skipped },
            (written, 0) => Outcome::Written(written),
            (written, skipped) => Outcome::WrittenWithWarnings { written, skipped },
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing usable in the source; the output holds an empty table
    NoDebugData {
        /// Number of records skipped
        skipped: usize,
    },
    /// All records were used
    Written(usize),
    /// Some records were skipped
    WrittenWithWarnings {
        /// Number of breakpoint rows written
        written: usize,
        /// Number of records skipped
        skipped: usize,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDebugData { skipped: 0 } => write!(f, "no valid debug data found"),
            Self::NoDebugData { skipped } => {
                write!(f, "no valid debug data found, skipped {skipped} invalid records")
            }
            Self::Written(n) => write!(f, "wrote {n} breakpoints"),
            Self::WrittenWithWarnings { written, skipped } => {
                write!(f, "wrote {written} breakpoints, skipped {skipped} invalid records")
            }
        }
    }
}

/// Drives a conversion according to a [`ConvertConfig`].
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    /// Creates a converter for `config`.
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    fn synthesizer(&self) -> Synthesizer {
        Synthesizer::new(self.config.synthesis.policy())
            .with_max_examples(self.config.synthesis.max_reported_examples)
    }

    /// Extracts from `source` and synthesizes breakpoints.
    pub fn convert(&self, source: &mut dyn StateSource) -> Result<Conversion, ConvertError> {
        let locations = source.fetch_state_locations()?;
        info!(records = locations.len(), "Extracted state locations");

        let synthesis = self.synthesizer().synthesize(&locations)?;
        Ok(Conversion {
            extracted: locations.len(),
            breakpoints: synthesis.breakpoints,
            skipped: synthesis.skipped,
        })
    }

    /// Converts the configured source without writing anything.
    pub fn preview(&self) -> Result<Conversion, ConvertError> {
        let mut source = open_source(&self.config.source)?;
        self.convert(source.as_mut())
    }

    /// Converts the configured source and writes the result to `output`.
    pub fn run(&self, output: &Path) -> Result<ConversionReport, ConvertError> {
        let conversion = self.preview()?;
        let written = self.write(output, &conversion.breakpoints)?;

        let report = ConversionReport {
            extracted: conversion.extracted,
            written,
            skipped: conversion.skipped,
        };
        match report.outcome() {
            outcome @ Outcome::NoDebugData { .. } => warn!(path = %output.display(), "{outcome}"),
            outcome => info!(path = %output.display(), "{outcome}"),
        }
        for example in &report.skipped.examples {
            warn!("skipped {example}");
        }
        Ok(report)
    }

    fn write(&self, output: &Path, breakpoints: &[Breakpoint]) -> Result<usize, ConvertError> {
        let mut writer = BreakpointWriter::create(output, self.config.output.overwrite)?;
        match writer.write(breakpoints) {
            Ok(written) => Ok(written),
            Err(err) => {
                drop(writer);
                if let Err(e) = fs::remove_file(output) {
                    warn!(path = %output.display(), error = %e, "Cannot remove partial output");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::create_qsort_database, InvalidRecordPolicy};
    use hgdb_legup_common::{logging::ensure_test_logging, InvalidReason, StateLocation};
    use rusqlite::Connection;

    fn scenario() -> Vec<StateLocation> {
        vec![
            StateLocation::new(1, "a.c", 10),
            StateLocation::new(2, "a.c", 10),
            StateLocation::new(3, "b.c", 20),
            StateLocation { state_id: 4, filename: None, line_number: 10 },
            StateLocation::new(5, "a.c", 0),
        ]
    }

    #[test]
    fn test_convert_counts_and_skips() {
        ensure_test_logging(None);
        let conversion = Converter::default().convert(&mut scenario()).unwrap();

        assert_eq!(conversion.extracted, 5);
        assert_eq!(conversion.breakpoints.len(), 2);
        assert_eq!(conversion.breakpoints[0].condition, "cur_state == 1 || cur_state == 2");
        assert_eq!(conversion.skipped.count, 2);
        assert_eq!(conversion.skipped.examples[0].reason, InvalidReason::EmptyFilename);
    }

    #[test]
    fn test_convert_strict_aborts() {
        let converter = Converter::new(ConvertConfig::default().with_strict(true));
        assert!(converter.config().synthesis.strict);
        assert_eq!(converter.synthesizer().policy(), InvalidRecordPolicy::Abort);

        let err = converter.convert(&mut scenario()).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidLocation { index: 3, .. }), "{err:?}");
    }

    #[test]
    fn test_outcome_messages() {
        let mut report = ConversionReport::default();
        assert_eq!(report.outcome(), Outcome::NoDebugData { skipped: 0 });
        assert_eq!(report.outcome().to_string(), "no valid debug data found");

        report.skipped.count = 2;
        assert_eq!(report.outcome(), Outcome::NoDebugData { skipped: 2 });
        assert_eq!(
            report.outcome().to_string(),
            "no valid debug data found, skipped 2 invalid records"
        );

        report.skipped.count = 0;
        report.written = 12;
        assert_eq!(report.outcome().to_string(), "wrote 12 breakpoints");

        report.skipped.count = 3;
        assert_eq!(
            report.outcome().to_string(),
            "wrote 12 breakpoints, skipped 3 invalid records"
        );
    }

    #[test]
    fn test_conversion_json() {
        let conversion = Converter::default().convert(&mut scenario()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&conversion.to_json().unwrap()).unwrap();

        assert_eq!(json["extracted"], 5);
        assert_eq!(json["breakpoints"][1]["filename"], "b.c");
        assert_eq!(json["breakpoints"][1]["line_number"], 20);
        assert_eq!(json["skipped"]["count"], 2);
    }

    #[test]
    fn test_run_writes_database() {
        ensure_test_logging(None);
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("legup.db");
        let output = dir.path().join("debug.db");
        create_qsort_database(&input).unwrap();

        let converter = Converter::new(ConvertConfig::default().with_sqlite_source(&input));
        let report = converter.run(&output).unwrap();
        assert!(matches!(report.outcome(), Outcome::Written(_)));
        assert_eq!(report.written, 13);

        let conn = Connection::open(&output).unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM breakpoint", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 13);
    }

    #[test]
    fn test_run_empty_source_writes_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("legup.db");
        let output = dir.path().join("debug.db");
        crate::test_utils::create_legup_database(&input, &[]).unwrap();

        let converter = Converter::new(ConvertConfig::default().with_sqlite_source(&input));
        let report = converter.run(&output).unwrap();
        assert_eq!(report.outcome(), Outcome::NoDebugData { skipped: 0 });
        assert!(output.exists());
    }

    #[test]
    fn test_run_all_invalid_reports_skipped() {
        ensure_test_logging(None);
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("legup.db");
        let output = dir.path().join("debug.db");
        crate::test_utils::create_legup_database(&input, &[(1, None, 3), (2, Some("a.c"), 0)])
            .unwrap();

        let converter = Converter::new(ConvertConfig::default().with_sqlite_source(&input));
        let report = converter.run(&output).unwrap();
        assert_eq!(report.written, 0);
        assert_eq!(report.outcome(), Outcome::NoDebugData { skipped: 2 });
        assert!(report.outcome().to_string().ends_with("skipped 2 invalid records"));
    }

    #[test]
    fn test_fatal_error_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("debug.db");

        let converter = Converter::new(
            ConvertConfig::default().with_sqlite_source(dir.path().join("missing.db")),
        );
        let err = converter.run(&output).unwrap_err();
        assert!(matches!(err, ConvertError::SourceUnavailable(_)), "{err:?}");
        assert!(!output.exists());
    }

    #[test]
    fn test_strict_failure_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("legup.db");
        let output = dir.path().join("debug.db");
        crate::test_utils::create_legup_database(
            &input,
            &[(1, Some("a.c"), 10), (2, None, 11)],
        )
        .unwrap();

        let converter =
            Converter::new(ConvertConfig::default().with_sqlite_source(&input).with_strict(true));
        assert!(converter.run(&output).is_err());
        assert!(!output.exists());
    }
}
