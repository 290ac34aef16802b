//! Run results and the run log
//!
//! Results are structured ([`Outcome`] is a success/failure sum type) and
//! only become text at the serialization boundary:
//!
//! ```text
//! Running Matmul workload:
//!   Matmul (4096, 320, 320) -> Cycles 87234
//!   Matmul (1024, 640, 640) -> ERROR: simulator exited with exit status: 1
//! ```

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::HarnessConfig;
use crate::Result;

/// Result of one simulator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// Simulator exited cleanly; `output` is the trimmed output file.
    Success {
        /// Output file contents
        output: String,
    },
    /// Encoding or invocation failed for this item.
    Failure {
        /// Human-readable diagnostic
        message: String,
    },
}

impl Outcome {
    /// Successful outcome.
    #[must_use]
    pub fn success(output: impl Into<String>) -> Self {
        Self::Success {
            output: output.into(),
        }
    }

    /// Failed outcome.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Whether the invocation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Cycle count from the first `Cycles <n>` line of a successful output.
    #[must_use]
    pub fn cycles(&self) -> Option<u64> {
        let Self::Success { output } = self else {
            return None;
        };
        output.lines().find_map(|line| {
            let mut tokens = line.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (Some("Cycles"), Some(n)) => n.parse().ok(),
                _ => None,
            }
        })
    }
}

/// One labeled invocation result, appended to the log and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    label: String,
    outcome: Outcome,
}

impl RunResult {
    /// Create a result.
    #[must_use]
    pub fn new(label: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            label: label.into(),
            outcome,
        }
    }

    /// Label, e.g. `Matmul (4096, 320, 320)` or `ResNet Stage (0)`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Invocation outcome.
    #[must_use]
    pub const fn outcome(&self) -> &Outcome {
        &self.outcome
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Success { output } => write!(f, "{} -> {output}", self.label),
            Outcome::Failure { message } => write!(f, "{} -> ERROR: {message}", self.label),
        }
    }
}

/// All results of one catalog workload, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRun {
    name: String,
    results: Vec<RunResult>,
}

impl WorkloadRun {
    /// Workload name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Results in invocation order.
    #[must_use]
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }
}

/// Ordered results of a full driver pass, grouped by workload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLog {
    workloads: Vec<WorkloadRun>,
}

impl RunLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new workload group. Groups appear in the order they are begun.
    pub fn begin_workload(&mut self, name: impl Into<String>) {
        self.workloads.push(WorkloadRun {
            name: name.into(),
            results: Vec::new(),
        });
    }

    /// Append a result to the most recently begun workload.
    ///
    /// Opens an unnamed group if none has been begun.
    pub fn push(&mut self, result: RunResult) {
        if self.workloads.is_empty() {
            self.begin_workload("");
        }
        if let Some(group) = self.workloads.last_mut() {
            group.results.push(result);
        }
    }

    /// Workload groups in order.
    #[must_use]
    pub fn workloads(&self) -> &[WorkloadRun] {
        &self.workloads
    }

    /// All results, flattened in catalog order.
    pub fn results(&self) -> impl Iterator<Item = &RunResult> {
        self.workloads.iter().flat_map(|w| w.results.iter())
    }

    /// Result labels in catalog order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.results().map(RunResult::label).collect()
    }

    /// Number of successful invocations.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.results().filter(|r| r.outcome.is_success()).count()
    }

    /// Number of failed items.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.results().filter(|r| !r.outcome.is_success()).count()
    }

    /// Render the text log.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the text log, replacing any previous run.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be written.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.render())?;
        Ok(())
    }
}

impl fmt::Display for RunLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.workloads {
            writeln!(f, "Running {} workload:", group.name)?;
            for result in &group.results {
                writeln!(f, "  {result}")?;
            }
        }
        Ok(())
    }
}

/// Structured companion to the text log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    config: HarnessConfig,
    succeeded: usize,
    failed: usize,
    log: RunLog,
}

impl RunSummary {
    /// Summarize a finished run.
    #[must_use]
    pub fn new(config: &HarnessConfig, started_at: DateTime<Utc>, log: &RunLog) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            config: config.clone(),
            succeeded: log.success_count(),
            failed: log.failure_count(),
            log: log.clone(),
        }
    }

    /// Write as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
