//! Experiment Driver
//!
//! One pass over the catalog, strictly sequential:
//!
//! ```text
//! for workload in catalog (insertion order)
//!   Simple    -> for entry: encode_entry -> invoke(count = 1)           -> RunResult
//!   Composite -> for stage: encode_stage -> invoke(count = stage.len()) -> RunResult
//! ```
//!
//! Item failures (bad shapes, simulator errors) are recorded and the pass
//! continues. Environment failures stop the pass.

use chrono::Utc;
use tracing::{info, info_span, warn};

use crate::catalog::{AliasTable, CompositeStage, WorkloadCatalog, WorkloadEntry, WorkloadSpec};
use crate::config::HarnessConfig;
use crate::encoder::{EncodedInput, RecordEncoder};
use crate::invoker::{ProcessSimulator, Simulator};
use crate::runlog::{Outcome, RunLog, RunResult, RunSummary};
use crate::Result;

/// Drives a [`Simulator`] over a [`WorkloadCatalog`].
pub struct ExperimentDriver<S> {
    config: HarnessConfig,
    aliases: AliasTable,
    simulator: S,
}

impl ExperimentDriver<ProcessSimulator> {
    /// Driver backed by the configured simulator binary.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the configuration is invalid.
    pub fn from_config(config: HarnessConfig, aliases: AliasTable) -> Result<Self> {
        config.validate()?;
        let simulator = ProcessSimulator::from_config(&config);
        Ok(Self::new(config, aliases, simulator))
    }
}

impl<S: Simulator> ExperimentDriver<S> {
    /// Driver over any simulator implementation.
    #[must_use]
    pub fn new(config: HarnessConfig, aliases: AliasTable, simulator: S) -> Self {
        Self {
            config,
            aliases,
            simulator,
        }
    }

    /// Harness configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Give back the simulator (useful for inspecting test doubles).
    pub fn into_simulator(self) -> S {
        self.simulator
    }

    /// Run every catalog item once, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns error on environment failures (input/output files, simulator
    /// launch). Item-level failures are recorded in the returned log.
    pub fn run_all(&mut self, catalog: &WorkloadCatalog) -> Result<RunLog> {
        let mut log = RunLog::new();
        for workload in catalog {
            let name = workload.name();
            let _span = info_span!("workload", name).entered();
            info!(
                invocations = workload.spec().invocation_count(),
                composite = workload.spec().is_composite(),
                "running workload"
            );
            log.begin_workload(name);

            match workload.spec() {
                WorkloadSpec::Simple(entries) => {
                    for entry in entries {
                        let result = self.run_entry(name, entry)?;
                        log.push(result);
                    }
                }
                WorkloadSpec::Composite(stages) => {
                    for (index, stage) in stages.iter().enumerate() {
                        let result = self.run_stage(name, index, stage)?;
                        log.push(result);
                    }
                }
            }
        }
        info!(
            succeeded = log.success_count(),
            failed = log.failure_count(),
            "catalog pass complete"
        );
        Ok(log)
    }

    /// Run the catalog and write the text log (and JSON summary, if
    /// configured), replacing any previous run.
    ///
    /// # Errors
    ///
    /// Returns error on environment failures or if the log cannot be written.
    pub fn run_and_record(&mut self, catalog: &WorkloadCatalog) -> Result<RunLog> {
        let started_at = Utc::now();
        let log = self.run_all(catalog)?;
        log.write_to(&self.config.log_path)?;
        info!(path = %self.config.log_path.display(), "run log written");
        if let Some(path) = &self.config.summary_path {
            RunSummary::new(&self.config, started_at, &log).write_json(path)?;
            info!(path = %path.display(), "run summary written");
        }
        Ok(log)
    }

    fn run_entry(&mut self, workload: &str, entry: &WorkloadEntry) -> Result<RunResult> {
        let label = format!("{workload} {}", entry.dims_text());
        let encoded = RecordEncoder::new(&self.aliases).encode_entry(entry);
        let outcome = self.dispatch(encoded)?;
        Ok(self.record(label, outcome))
    }

    fn run_stage(
        &mut self,
        workload: &str,
        index: usize,
        stage: &CompositeStage,
    ) -> Result<RunResult> {
        let label = format!("{workload} Stage ({index})");
        let encoded = RecordEncoder::new(&self.aliases).encode_stage(stage);
        let outcome = self.dispatch(encoded)?;
        Ok(self.record(label, outcome))
    }

    /// Invoke the simulator, turning item-level encode errors into failures.
    fn dispatch(&mut self, encoded: Result<EncodedInput>) -> Result<Outcome> {
        match encoded {
            Ok(input) => self.simulator.invoke(input.text(), input.count()),
            Err(e) if e.is_item_level() => Ok(Outcome::failure(e.to_string())),
            Err(e) => Err(e),
        }
    }

    #[allow(clippy::unused_self)]
    fn record(&self, label: String, outcome: Outcome) -> RunResult {
        match &outcome {
            Outcome::Success { .. } => info!(%label, cycles = ?outcome.cycles(), "ok"),
            Outcome::Failure { message } => warn!(%label, %message, "failed"),
        }
        RunResult::new(label, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn matmul_catalog() -> WorkloadCatalog {
        let mut catalog = WorkloadCatalog::new();
        catalog
            .push(
                "Matmul",
                WorkloadSpec::simple("Matmul", [vec![4096, 320, 320], vec![1024, 640, 640]]),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_simple_labels() {
        let stub = |_: &str, _: usize| -> Result<Outcome> { Ok(Outcome::success("Cycles 100")) };
        let mut driver = ExperimentDriver::new(HarnessConfig::default(), AliasTable::new(), stub);
        let log = driver.run_all(&matmul_catalog()).unwrap();
        assert_eq!(
            log.render(),
            "Running Matmul workload:\n\
             \x20 Matmul (4096, 320, 320) -> Cycles 100\n\
             \x20 Matmul (1024, 640, 640) -> Cycles 100\n"
        );
    }

    #[test]
    fn test_encoding_failure_does_not_invoke() {
        let mut calls = 0;
        let stub = |_: &str, _: usize| -> Result<Outcome> {
            calls += 1;
            Ok(Outcome::success("Cycles 1"))
        };
        let mut catalog = WorkloadCatalog::new();
        catalog
            .push("Odd", WorkloadSpec::simple("Odd", [vec![1], vec![2, 3]]))
            .unwrap();
        let mut driver = ExperimentDriver::new(HarnessConfig::default(), AliasTable::new(), stub);
        let log = driver.run_all(&catalog).unwrap();
        drop(driver);
        assert_eq!(calls, 1);
        assert_eq!(log.failure_count(), 1);
        assert!(log.render().contains("Odd (1) -> ERROR: Unexpected number of dimensions: 1"));
    }

    #[test]
    fn test_environment_error_aborts() {
        let stub = |_: &str, _: usize| -> Result<Outcome> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "input.txt",
            )))
        };
        let mut driver = ExperimentDriver::new(HarnessConfig::default(), AliasTable::new(), stub);
        assert!(matches!(driver.run_all(&matmul_catalog()), Err(Error::Io(_))));
    }
}
