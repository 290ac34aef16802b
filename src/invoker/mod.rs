//! Simulation Invoker
//!
//! The simulator is an opaque executable that reads an input file and writes
//! an output file. [`Simulator`] is the seam the driver talks to, so the file
//! channel can be swapped for a test double.
//!
//! # Example
//!
//! ```rust
//! use sim_harness::invoker::Simulator;
//! use sim_harness::runlog::Outcome;
//! use sim_harness::Result;
//!
//! // Closures are simulators too.
//! let mut stub = |_input: &str, count: usize| -> Result<Outcome> {
//!     Ok(Outcome::success(format!("Cycles {}", 100 * count)))
//! };
//! let outcome = stub.invoke("Matmul 64 1280 1280\n", 1)?;
//! assert_eq!(outcome.cycles(), Some(100));
//! # Ok::<(), sim_harness::Error>(())
//! ```

mod process;

pub use process::ProcessSimulator;

use crate::runlog::Outcome;
use crate::Result;

/// Runs one simulator invocation.
pub trait Simulator {
    /// Simulate `input_text`, whose first `count` records form one timed run.
    ///
    /// A simulator-level failure (non-zero exit, timeout) is returned as
    /// `Ok(Outcome::Failure { .. })`.
    ///
    /// # Errors
    ///
    /// Returns error only when the harness itself is unusable (input/output
    /// files cannot be written or read, binary cannot be launched).
    fn invoke(&mut self, input_text: &str, count: usize) -> Result<Outcome>;
}

impl<F> Simulator for F
where
    F: FnMut(&str, usize) -> Result<Outcome>,
{
    fn invoke(&mut self, input_text: &str, count: usize) -> Result<Outcome> {
        self(input_text, count)
    }
}
