//! `sim-harness` — run the workload catalog through the simulator and compare
//! the results against reference hardware latencies.
//!
//! ```text
//! USAGE:
//!   sim-harness [--config <file>] run [--catalog <file>]    Simulate every workload, write the run log
//!   sim-harness [--config <file>] analyze [--labeled]       Parse the run log, compare against reference
//!   sim-harness catalog [--catalog <file>]                  Print the catalog as JSON
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sim_harness::analyzer::{AlignmentPolicy, Analyzer};
use sim_harness::catalog::builtin::{default_aliases, tpu_v3_catalog};
use sim_harness::catalog::{AliasTable, CatalogFile, WorkloadCatalog};
use sim_harness::config::HarnessConfig;
use sim_harness::driver::ExperimentDriver;
use sim_harness::reference::{self, ReferenceSeries};

#[derive(Parser)]
#[command(name = "sim-harness", about = "Accelerator simulator experiment harness", version)]
struct Cli {
    /// Harness configuration (JSON). Defaults reproduce the TPU v3 setup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Simulate every catalog workload and write the run log.
    Run {
        /// Catalog file (JSON); the built-in TPU v3 catalog otherwise.
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Override the simulator binary.
        #[arg(long)]
        simulator: Option<PathBuf>,
        /// Override the run log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Also write a JSON summary here.
        #[arg(long)]
        summary: Option<PathBuf>,
        /// Kill a simulator invocation after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Parse a run log and compare latencies against reference data.
    Analyze {
        /// Run log to read; the configured log path otherwise.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Reference series (JSON); the built-in TPU v3 data otherwise.
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Require operation names to match at every position.
        #[arg(long)]
        labeled: bool,
        /// Print only the latency series, one value per line.
        #[arg(long)]
        series_only: bool,
    },
    /// Print the catalog and alias table as JSON.
    Catalog {
        /// Catalog file (JSON); the built-in TPU v3 catalog otherwise.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => HarnessConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HarnessConfig::default(),
    };

    match cli.command {
        Cmd::Run {
            catalog,
            simulator,
            log,
            summary,
            timeout,
        } => {
            let mut config = config;
            if let Some(simulator) = simulator {
                config = config.with_simulator(simulator);
            }
            if let Some(log) = log {
                config = config.with_log_path(log);
            }
            if let Some(summary) = summary {
                config = config.with_summary_path(summary);
            }
            if let Some(secs) = timeout {
                config = config.with_timeout_secs(secs);
            }
            cmd_run(config, catalog)?;
        }
        Cmd::Analyze {
            log,
            reference,
            labeled,
            series_only,
        } => {
            let log = log.unwrap_or_else(|| config.log_path.clone());
            let policy = if labeled {
                AlignmentPolicy::Labeled
            } else {
                AlignmentPolicy::Positional
            };
            cmd_analyze(&config, &log, reference, policy, series_only)?;
        }
        Cmd::Catalog { catalog } => cmd_catalog(catalog)?,
    }

    Ok(())
}

fn load_catalog(path: Option<PathBuf>) -> Result<(WorkloadCatalog, AliasTable)> {
    match path {
        Some(path) => {
            let file = CatalogFile::load(&path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            Ok(file.into_parts()?)
        }
        None => Ok((tpu_v3_catalog(), default_aliases())),
    }
}

fn cmd_run(config: HarnessConfig, catalog: Option<PathBuf>) -> Result<()> {
    let (catalog, aliases) = load_catalog(catalog)?;
    let log_path = config.log_path.clone();
    let mut driver = ExperimentDriver::from_config(config, aliases)?;
    let log = driver
        .run_and_record(&catalog)
        .context("simulation harness failed")?;

    println!(
        "{} workloads, {} invocations: {} ok, {} failed",
        catalog.len(),
        catalog.invocation_count(),
        log.success_count(),
        log.failure_count()
    );
    println!("Run log: {}", log_path.display());
    Ok(())
}

fn cmd_analyze(
    config: &HarnessConfig,
    log: &Path,
    reference: Option<PathBuf>,
    policy: AlignmentPolicy,
    series_only: bool,
) -> Result<()> {
    let analyzer = Analyzer::new(config.clock_mhz)?;
    let records = analyzer
        .extract_file(log)
        .with_context(|| format!("reading run log {}", log.display()))?;

    if series_only {
        for value in analyzer.latency_series(&records).values() {
            println!("{value}");
        }
        return Ok(());
    }

    let reference = match reference {
        Some(path) => ReferenceSeries::load(&path)
            .with_context(|| format!("loading reference {}", path.display()))?,
        None => reference::tpu_v3(),
    };
    let report = analyzer.compare(&records, &reference, policy)?;

    println!(
        "{:<40} {:>12} {:>12} {:>9}",
        "Workload", "Sim (us)", "Ref (us)", "Err (%)"
    );
    for row in report.rows() {
        println!(
            "{:<40} {:>12.3} {:>12.3} {:>9.2}",
            row.label, row.measured_us, row.reference_us, row.relative_error_pct
        );
    }
    if let Some(mean) = report.mean_relative_error() {
        println!();
        println!("Mean relative error: {mean:.2}%");
    }
    if let Some(worst) = report.worst() {
        println!(
            "Worst: {} ({:.2}%)",
            worst.label, worst.relative_error_pct
        );
    }
    Ok(())
}

fn cmd_catalog(catalog: Option<PathBuf>) -> Result<()> {
    let (catalog, aliases) = load_catalog(catalog)?;
    let json = CatalogFile::from_catalog(&catalog, &aliases).to_json_string()?;
    println!("{json}");
    Ok(())
}
