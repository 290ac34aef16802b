//! # sim-harness: Accelerator Simulator Experiment Harness
//!
//! Drives a cycle-accurate accelerator simulator over a catalog of tensor
//! workloads (matmul, convolution, softmax, attention, fused residual
//! blocks), records per-workload cycle counts in a flat run log, and turns
//! that log into latencies comparable against measured hardware numbers.
//!
//! ## Pipeline
//!
//! ```text
//! WorkloadCatalog ──> RecordEncoder ──> Simulator ──> RunLog (results.txt)
//!                                                        │
//!                     ReferenceSeries ──> Analyzer <─────┘
//! ```
//!
//! - **Sequential by construction**: every invocation reuses one
//!   input/output file pair, so the driver never overlaps invocations.
//! - **Per-item isolation**: a bad shape or a failing simulator run is
//!   recorded as `ERROR:` and the pass continues.
//! - **Positional comparison**: the extracted latency series lines up with
//!   reference data by index, in catalog order.
//!
//! ## Example Usage
//!
//! ```rust
//! use sim_harness::analyzer::Analyzer;
//! use sim_harness::catalog::{AliasTable, WorkloadCatalog, WorkloadSpec};
//! use sim_harness::config::HarnessConfig;
//! use sim_harness::driver::ExperimentDriver;
//! use sim_harness::runlog::Outcome;
//!
//! let mut catalog = WorkloadCatalog::new();
//! catalog.push("Matmul", WorkloadSpec::simple("Matmul", [vec![4096, 320, 320]]))?;
//!
//! // Any `FnMut(&str, usize) -> Result<Outcome>` can stand in for the binary.
//! let stub = |_: &str, _: usize| -> sim_harness::Result<Outcome> {
//!     Ok(Outcome::success("Cycles 100"))
//! };
//! let mut driver = ExperimentDriver::new(HarnessConfig::default(), AliasTable::new(), stub);
//! let log = driver.run_all(&catalog)?;
//!
//! let analyzer = Analyzer::new(100.0)?;
//! let records = analyzer.extract(&log.render());
//! assert_eq!(analyzer.latency_series(&records).values(), &[1.0]);
//! # Ok::<(), sim_harness::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod invoker;
pub mod reference;
pub mod runlog;

pub use error::{Error, Result};
