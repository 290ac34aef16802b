//! Result Analyzer
//!
//! Reads the run log back into `(operation, dimensions, cycles)` records,
//! converts cycles to microseconds and lines the results up against a
//! reference series.
//!
//! A log line is a data line when it starts (after indentation) with
//!
//! ```text
//! <operation> [Stage] (<dims>) -> Cycles <n>
//! ```
//!
//! Headers and `ERROR:` lines do not match and are skipped, whatever text the
//! error detail carries.
//!
//! ## Example
//!
//! ```rust
//! use sim_harness::analyzer::{relative_error, Analyzer};
//!
//! let analyzer = Analyzer::new(940.0)?;
//! let records = analyzer.extract(
//!     "Running Matmul workload:\n  Matmul (4096, 320, 320) -> Cycles 940\n",
//! );
//! let series = analyzer.latency_series(&records);
//! assert_eq!(series.values(), &[1.0]);
//! assert!(relative_error(92.8, 92.8).abs() < 1e-12);
//! # Ok::<(), sim_harness::Error>(())
//! ```

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reference::ReferenceSeries;
use crate::runlog::RunLog;
use crate::{Error, Result};

/// Log line pattern, anchored at the label. Composite labels carry a `Stage`
/// marker before the parenthesized stage index.
const RECORD_PATTERN: &str = r"^\s*(\w+)(?:\sStage)?\s\(([^)]+)\)\s->\sCycles\s(\d+)";

/// A bare result label, as held by [`crate::runlog::RunResult`].
const LABEL_PATTERN: &str = r"^(\w+)(?:\sStage)?\s\(([^)]+)\)$";

/// One data line of the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecord {
    /// Workload name
    pub operation: String,
    /// Text between the parentheses, e.g. `4096, 320, 320`
    pub dims_text: String,
    /// Simulated cycles
    pub cycles: u64,
}

impl ParsedRecord {
    /// Display label, e.g. `Matmul (4096, 320, 320)`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.operation, self.dims_text)
    }
}

/// Latencies in microseconds, index-aligned with the records they came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatencySeries(Vec<f64>);

impl LatencySeries {
    /// Latencies in order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for LatencySeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// How measured records are matched to reference points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignmentPolicy {
    /// Position only; labels are carried along but not checked.
    #[default]
    Positional,
    /// Position, and the operation names must agree at every index.
    Labeled,
}

/// One aligned measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Measured label from the run log
    pub label: String,
    /// Simulated latency (µs)
    pub measured_us: f64,
    /// Reference latency (µs)
    pub reference_us: f64,
    /// `100 * |measured - reference| / reference`
    pub relative_error_pct: f64,
}

/// All aligned measurements of one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    rows: Vec<Comparison>,
}

impl ComparisonReport {
    /// Rows in series order.
    #[must_use]
    pub fn rows(&self) -> &[Comparison] {
        &self.rows
    }

    /// Mean relative error in percent, `None` for an empty report.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_relative_error(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let total: f64 = self.rows.iter().map(|r| r.relative_error_pct).sum();
        Some(total / self.rows.len() as f64)
    }

    /// Row with the largest relative error.
    #[must_use]
    pub fn worst(&self) -> Option<&Comparison> {
        self.rows
            .iter()
            .max_by(|a, b| a.relative_error_pct.total_cmp(&b.relative_error_pct))
    }
}

/// `100 * |measured - reference| / reference`.
///
/// A zero reference yields infinity (or NaN when both are zero).
#[must_use]
pub fn relative_error(measured: f64, reference: f64) -> f64 {
    100.0 * (measured - reference).abs() / reference
}

/// `cycles / clock_mhz` for every record, in order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn latency_series(records: &[ParsedRecord], clock_mhz: f64) -> LatencySeries {
    LatencySeries(
        records
            .iter()
            .map(|r| r.cycles as f64 / clock_mhz)
            .collect(),
    )
}

/// Parses run logs and converts cycles at a fixed clock.
#[derive(Debug, Clone)]
pub struct Analyzer {
    clock_mhz: f64,
    pattern: Regex,
    label_pattern: Regex,
}

impl Analyzer {
    /// Create an analyzer for a clock frequency in MHz.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the clock is not a positive number.
    pub fn new(clock_mhz: f64) -> Result<Self> {
        if !(clock_mhz.is_finite() && clock_mhz > 0.0) {
            return Err(Error::Config(format!(
                "clock_mhz must be positive, got {clock_mhz}"
            )));
        }
        let pattern = Regex::new(RECORD_PATTERN)
            .map_err(|e| Error::Other(format!("invalid record pattern: {e}")))?;
        let label_pattern = Regex::new(LABEL_PATTERN)
            .map_err(|e| Error::Other(format!("invalid label pattern: {e}")))?;
        Ok(Self {
            clock_mhz,
            pattern,
            label_pattern,
        })
    }

    /// Clock frequency in MHz.
    #[must_use]
    pub const fn clock_mhz(&self) -> f64 {
        self.clock_mhz
    }

    /// Extract one record per matching line, in file order.
    #[must_use]
    pub fn extract(&self, log_text: &str) -> Vec<ParsedRecord> {
        let records: Vec<ParsedRecord> = log_text
            .lines()
            .filter_map(|line| self.parse_line(line))
            .collect();
        debug!(records = records.len(), "extracted run log records");
        records
    }

    /// Read and extract a run log file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ParsedRecord>> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(self.extract(&text))
    }

    /// Records straight from an in-memory run, skipping failures and
    /// successes without a cycle count.
    #[must_use]
    pub fn records_from_run(&self, log: &RunLog) -> Vec<ParsedRecord> {
        log.results()
            .filter_map(|result| {
                let cycles = result.outcome().cycles()?;
                let caps = self.label_pattern.captures(result.label())?;
                Some(ParsedRecord {
                    operation: caps[1].to_string(),
                    dims_text: caps[2].to_string(),
                    cycles,
                })
            })
            .collect()
    }

    /// Latencies for `records` at this analyzer's clock.
    #[must_use]
    pub fn latency_series(&self, records: &[ParsedRecord]) -> LatencySeries {
        latency_series(records, self.clock_mhz)
    }

    /// Align records against a reference series.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Alignment`] if the lengths differ, and under
    /// [`AlignmentPolicy::Labeled`] returns [`Error::LabelMismatch`] at the
    /// first index whose operation names disagree.
    pub fn compare(
        &self,
        records: &[ParsedRecord],
        reference: &ReferenceSeries,
        policy: AlignmentPolicy,
    ) -> Result<ComparisonReport> {
        if records.len() != reference.len() {
            return Err(Error::Alignment {
                measured: records.len(),
                reference: reference.len(),
            });
        }
        let series = self.latency_series(records);
        let mut rows = Vec::with_capacity(records.len());
        for (index, ((record, &measured), point)) in records
            .iter()
            .zip(series.values())
            .zip(reference.points())
            .enumerate()
        {
            if policy == AlignmentPolicy::Labeled && record.operation != point.operation {
                return Err(Error::LabelMismatch {
                    index,
                    measured: record.label(),
                    reference: point.label(),
                });
            }
            rows.push(Comparison {
                label: record.label(),
                measured_us: measured,
                reference_us: point.latency_us,
                relative_error_pct: relative_error(measured, point.latency_us),
            });
        }
        Ok(ComparisonReport { rows })
    }

    fn parse_line(&self, line: &str) -> Option<ParsedRecord> {
        let caps = self.pattern.captures(line)?;
        let cycles = caps[3].parse().ok()?;
        Some(ParsedRecord {
            operation: caps[1].to_string(),
            dims_text: caps[2].to_string(),
            cycles,
        })
    }
}
