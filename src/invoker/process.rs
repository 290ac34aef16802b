//! External simulator process over a file pair

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::Simulator;
use crate::config::HarnessConfig;
use crate::runlog::Outcome;
use crate::{Error, Result};

/// How often a running simulator is polled when a timeout is set.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Launches the simulator binary once per invocation.
///
/// Every invocation overwrites the same input/output pair, so one
/// `ProcessSimulator` must not be shared by concurrent callers. Give each
/// concurrent caller its own pair via [`ProcessSimulator::with_channel`].
#[derive(Debug, Clone)]
pub struct ProcessSimulator {
    binary: PathBuf,
    base_args: Vec<String>,
    input_path: PathBuf,
    output_path: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessSimulator {
    /// Build from a harness configuration.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            binary: config.simulator.clone(),
            base_args: config.arch.args(),
            input_path: config.input_path.clone(),
            output_path: config.output_path.clone(),
            timeout: config.timeout(),
        }
    }

    /// Use a different input/output file pair.
    #[must_use]
    pub fn with_channel(mut self, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        self.input_path = input.into();
        self.output_path = output.into();
        self
    }

    /// Input file path.
    #[must_use]
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Output file path.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Full argument list for an invocation of `count` records.
    #[must_use]
    pub fn args(&self, count: usize) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.extend([
            "-c".to_string(),
            count.to_string(),
            "-i".to_string(),
            self.input_path.display().to_string(),
            "-o".to_string(),
            self.output_path.display().to_string(),
        ]);
        args
    }

    fn spawn(&self, count: usize) -> Result<Child> {
        let args = self.args(count);
        debug!(binary = %self.binary.display(), args = %args.join(" "), "launching simulator");
        Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                binary: self.binary.clone(),
                source,
            })
    }

    /// Wait for exit, killing the child once the timeout elapses.
    ///
    /// Returns `None` on timeout.
    fn wait(&self, child: &mut Child) -> Result<Option<ExitStatus>> {
        let Some(timeout) = self.timeout else {
            return Ok(Some(child.wait()?));
        };
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                // The child may exit between try_wait and kill.
                if let Err(e) = child.kill() {
                    if e.kind() != ErrorKind::InvalidInput {
                        return Err(e.into());
                    }
                }
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn clear_output(&self) -> Result<()> {
        match std::fs::remove_file(&self.output_path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

impl Simulator for ProcessSimulator {
    fn invoke(&mut self, input_text: &str, count: usize) -> Result<Outcome> {
        std::fs::write(&self.input_path, input_text)?;
        self.clear_output()?;

        let mut child = self.spawn(count)?;

        // Drain stderr on its own thread so a chatty simulator cannot fill
        // the pipe and stall before exiting.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        let Some(status) = self.wait(&mut child)? else {
            // A grandchild may still hold the stderr pipe open, so the
            // reader is detached rather than joined.
            drop(stderr_reader);
            let secs = self.timeout.map_or(0, |t| t.as_secs());
            warn!(timeout_secs = secs, "simulator timed out");
            return Ok(Outcome::failure(format!("timed out after {secs}s")));
        };

        if !status.success() {
            let stderr = stderr_reader
                .and_then(|handle| handle.join().ok())
                .unwrap_or_default();
            let detail = single_line(&String::from_utf8_lossy(&stderr));
            let message = if detail.is_empty() {
                format!("simulator exited with {status}")
            } else {
                format!("simulator exited with {status}: {detail}")
            };
            return Ok(Outcome::failure(message));
        }

        let output = std::fs::read_to_string(&self.output_path)?;
        Ok(Outcome::success(output.trim()))
    }
}

/// Collapse diagnostic text onto one line so it stays inside its log entry.
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}
