//! Error types for sim-harness
//!
//! Item-level failures (bad dimension counts, simulator exits) are recorded as
//! data in the run log. Everything in this enum that reaches the driver other
//! than [`Error::Encoding`] aborts the run.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// sim-harness error types
#[derive(Error, Debug)]
pub enum Error {
    /// Workload dimensions cannot be expressed in the simulator input format
    #[error("Unexpected number of dimensions: {} for operation {op} (expected 2, 3 or 4)", dims.len())]
    Encoding {
        /// Operation name as it appears in the catalog
        op: String,
        /// Offending dimension tuple
        dims: Vec<u64>,
    },

    /// Simulator binary could not be launched
    #[error("Failed to launch simulator {}: {source}", binary.display())]
    Spawn {
        /// Path of the simulator binary
        binary: PathBuf,
        /// Underlying OS error
        source: std::io::Error,
    },

    /// Invalid harness configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Measured and reference series differ in length
    #[error("Series length mismatch: {measured} measured vs {reference} reference values")]
    Alignment {
        /// Number of measured values
        measured: usize,
        /// Number of reference values
        reference: usize,
    },

    /// Measured and reference labels disagree at a position
    #[error("Label mismatch at position {index}: measured '{measured}' vs reference '{reference}'")]
    LabelMismatch {
        /// Position in the series
        index: usize,
        /// Label derived from the run log
        measured: String,
        /// Label of the reference value
        reference: String,
    },

    /// IO error on the input, output or log files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is confined to a single workload item.
    ///
    /// Item-level errors are recorded as failures and the run continues.
    #[must_use]
    pub const fn is_item_level(&self) -> bool {
        matches!(self, Self::Encoding { .. })
    }
}
