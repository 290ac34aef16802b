//! Harness configuration
//!
//! One explicit struct carries everything that used to be process-wide:
//! the simulator binary, its architecture flags, the file channel used to
//! talk to it, and the clock frequency used for latency conversion.
//!
//! ```rust
//! use sim_harness::config::HarnessConfig;
//!
//! let config = HarnessConfig::default()
//!     .with_simulator("./perf_model")
//!     .with_clock_mhz(940.0);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.arch.args()[0], "-sa_sz");
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default TPU v3 clock in MHz
pub const DEFAULT_CLOCK_MHZ: f64 = 940.0;

/// Fixed architecture flags passed to every simulator invocation in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchFlags {
    /// Systolic array size (`-sa_sz`)
    pub sa_sz: u32,
    /// Vector unit size (`-vu_sz`)
    pub vu_sz: u32,
    /// Weight stationary (1) or output stationary (0) (`-ws`)
    pub ws: u32,
    /// Clock frequency in GHz (`-f`)
    pub freq: f64,
}

impl Default for ArchFlags {
    fn default() -> Self {
        Self {
            sa_sz: 128,
            vu_sz: 1024,
            ws: 1,
            freq: 0.94,
        }
    }
}

impl ArchFlags {
    /// Base command-line flags, in the order the simulator documents them.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        vec![
            "-sa_sz".to_string(),
            self.sa_sz.to_string(),
            "-vu_sz".to_string(),
            self.vu_sz.to_string(),
            "-ws".to_string(),
            self.ws.to_string(),
            "-f".to_string(),
            self.freq.to_string(),
        ]
    }
}

/// Complete configuration for one driver pass and its analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Simulator executable
    pub simulator: PathBuf,
    /// Architecture flags
    pub arch: ArchFlags,
    /// Encoded workload file handed to the simulator (`-i`)
    pub input_path: PathBuf,
    /// File the simulator writes its results to (`-o`)
    pub output_path: PathBuf,
    /// Run log, overwritten on every run
    pub log_path: PathBuf,
    /// Optional structured JSON summary of the run
    pub summary_path: Option<PathBuf>,
    /// Clock used to turn cycles into microseconds
    pub clock_mhz: f64,
    /// Kill the simulator after this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            simulator: PathBuf::from("./../build/perf_model"),
            arch: ArchFlags::default(),
            input_path: PathBuf::from("input.txt"),
            output_path: PathBuf::from("out.txt"),
            log_path: PathBuf::from("results.txt"),
            summary_path: None,
            clock_mhz: DEFAULT_CLOCK_MHZ,
            timeout_secs: None,
        }
    }
}

impl HarnessConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, or fails
    /// [`HarnessConfig::validate`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a run cannot work without.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a non-positive clock, zero-sized units,
    /// a zero timeout or an input path equal to the output path.
    pub fn validate(&self) -> Result<()> {
        if !(self.clock_mhz.is_finite() && self.clock_mhz > 0.0) {
            return Err(Error::Config(format!(
                "clock_mhz must be positive, got {}",
                self.clock_mhz
            )));
        }
        if self.arch.sa_sz == 0 || self.arch.vu_sz == 0 {
            return Err(Error::Config(
                "sa_sz and vu_sz must be non-zero".to_string(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::Config("timeout_secs must be non-zero".to_string()));
        }
        if self.input_path == self.output_path {
            return Err(Error::Config(format!(
                "input and output paths must differ ({})",
                self.input_path.display()
            )));
        }
        Ok(())
    }

    /// Invocation timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Set the simulator executable.
    #[must_use]
    pub fn with_simulator(mut self, simulator: impl Into<PathBuf>) -> Self {
        self.simulator = simulator.into();
        self
    }

    /// Set the architecture flags.
    #[must_use]
    pub fn with_arch(mut self, arch: ArchFlags) -> Self {
        self.arch = arch;
        self
    }

    /// Place the input, output and log files in `dir`.
    #[must_use]
    pub fn with_workdir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.input_path = dir.join("input.txt");
        self.output_path = dir.join("out.txt");
        self.log_path = dir.join("results.txt");
        self
    }

    /// Set the run log path.
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Write a JSON summary next to the run log.
    #[must_use]
    pub fn with_summary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.summary_path = Some(path.into());
        self
    }

    /// Set the clock frequency in MHz.
    #[must_use]
    pub const fn with_clock_mhz(mut self, clock_mhz: f64) -> Self {
        self.clock_mhz = clock_mhz;
        self
    }

    /// Set the invocation timeout in seconds.
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}
