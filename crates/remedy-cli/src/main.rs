//! `remedy` - generate validated fixes for the cataloged defects
//!
//! Snapshots the target tree, asks the generative service for a corrective
//! snippet per cataloged bug, and writes the remediation report. Exits zero
//! only when every bug reached a generated solution.

use anyhow::{bail, Context};
use clap::Parser;
use remedy_catalog::{BugCatalog, BugDescriptor};
use remedy_core::{Orchestrator, RunConfig, RunObserver};
use remedy_engine::GeminiClient;
use remedy_report::RunTotals;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "remedy", version, about = "Automated defect remediation")]
struct Args {
    /// Root of the target source tree
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Report destination (default: <project-root>/remediation_report.txt)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Model identifier to drive
    #[arg(long)]
    model: Option<String>,

    /// Attempts per bug before giving up
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = 45)]
    attempt_timeout: u64,

    /// Optional wall-clock bound for the whole run, in seconds
    #[arg(long)]
    run_timeout: Option<u64>,
}

/// Prints run progress to the console
struct ConsoleReporter;

impl RunObserver for ConsoleReporter {
    fn on_snapshot_ready(&self, files: usize, chars: usize) {
        println!("Captured {files} files ({chars} characters)");
        println!();
    }

    fn on_bug_started(&self, position: usize, total: usize, bug: &BugDescriptor) {
        println!("--- Bug {position} of {total}: {} ---", bug.title);
    }

    fn on_bug_finished(
        &self,
        _position: usize,
        _total: usize,
        _bug: &BugDescriptor,
        solved: bool,
        running_success_rate: f64,
    ) {
        let status = if solved { "SOLUTION_GENERATED" } else { "FAILED" };
        println!("Status: {status} | running success rate: {running_success_rate:.1}%");
        println!();
    }

    fn on_run_finished(&self, totals: &RunTotals) {
        println!(
            "Processed {} bugs: {} solved, {} failed ({:.1}%) in {:.1}s",
            totals.total,
            totals.solved,
            totals.failed,
            totals.success_rate(),
            totals.elapsed.as_secs_f64(),
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let Some(api_key) = RunConfig::resolve_api_key() else {
        bail!("no API key found: set GEMINI_API_KEY or GOOGLE_API_KEY");
    };

    let mut config = RunConfig::new(&args.project_root)
        .with_max_attempts(args.max_attempts)
        .with_attempt_timeout(Duration::from_secs(args.attempt_timeout));
    if let Some(report) = args.report {
        config = config.with_report_path(report);
    }
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    if let Some(secs) = args.run_timeout {
        config = config.with_run_timeout(Duration::from_secs(secs));
    }

    let catalog = BugCatalog::reference();
    println!(
        "Remediating {} cataloged bugs under {}",
        catalog.len(),
        config.project_root.display()
    );

    let client = GeminiClient::new(api_key)
        .with_model(config.model.clone())
        .with_params(config.generation);

    let orchestrator = Orchestrator::new(config, catalog, Arc::new(client))
        .with_observer(Arc::new(ConsoleReporter));

    // Ctrl-C aborts the in-flight attempt and finalizes the report.
    let canceller = orchestrator.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("cancellation requested; finalizing report");
            canceller.cancel();
        }
    });

    let outcome = orchestrator
        .run()
        .await
        .context("remediation run aborted")?;

    if let Some(err) = &outcome.write_error {
        eprintln!("warning: {err}");
        eprintln!("the in-memory report above reflects the full run");
    } else {
        println!("Report written to {}", outcome.report_path.display());
    }

    if outcome.all_solved() {
        println!("All bug solutions generated; review the report before applying them.");
    } else {
        println!("Some bugs were not solved; see the report for failure analyses.");
    }

    std::process::exit(outcome.exit_code());
}
