//! The run orchestrator
//!
//! Sequences registry -> composer -> generator -> aggregator for every
//! cataloged bug. Bugs are processed strictly sequentially: the generative
//! service is the shared rate-limited resource, and one in-flight call at a
//! time keeps retry accounting deterministic.

use crate::config::RunConfig;
use crate::error::RunError;
use crate::observer::{NullObserver, RunObserver};
use crate::state::{allowed_bug_transitions, BugPhase, RunPhase, RunState};
use remedy_catalog::{BugCatalog, CatalogError};
use remedy_engine::{
    AdviceGenerator, AttemptOutcome, FixGenerator, FixVerdict, GenerativeService, PromptComposer,
    ADVICE_UNAVAILABLE,
};
use remedy_report::{write_to_file, ReportAggregator, ReportEntry, ReportWriteError, RunReport};
use remedy_snapshot::SnapshotBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Cancels an in-flight run
#[derive(Debug, Clone)]
pub struct Canceller(Arc<watch::Sender<bool>>);

impl Canceller {
    /// Signal cancellation; in-flight attempts abort and the run proceeds
    /// straight to finalization
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

/// Outcome of a finished run
///
/// The in-memory report is always present, even when persisting it failed.
#[derive(Debug)]
pub struct RunOutcome {
    /// The finalized report
    pub report: RunReport,
    /// Where the report was (or should have been) written
    pub report_path: PathBuf,
    /// Set when persisting the report failed
    pub write_error: Option<ReportWriteError>,
}

impl RunOutcome {
    /// Whether every cataloged bug reached a generated solution
    #[inline]
    #[must_use]
    pub fn all_solved(&self) -> bool {
        self.report.totals().all_solved()
    }

    /// Process exit status for this outcome
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.all_solved())
    }
}

/// Drives one remediation run end to end
pub struct Orchestrator {
    config: RunConfig,
    catalog: BugCatalog,
    service: Arc<dyn GenerativeService>,
    observer: Arc<dyn RunObserver>,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("bugs", &self.catalog.len())
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator over a validated catalog and a service
    #[must_use]
    pub fn new(
        config: RunConfig,
        catalog: BugCatalog,
        service: Arc<dyn GenerativeService>,
    ) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            config,
            catalog,
            service,
            observer: Arc::new(NullObserver),
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        }
    }

    /// With a progress observer
    #[inline]
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Handle for cancelling this run from outside
    #[must_use]
    pub fn canceller(&self) -> Canceller {
        Canceller(Arc::clone(&self.cancel_tx))
    }

    /// Run the pipeline across the whole catalog
    ///
    /// # Errors
    /// Only fatal, run-aborting conditions: an empty registry
    /// (`RunError::Config`) or an uncapturable target tree
    /// (`RunError::Snapshot`). Per-bug failures degrade that bug's report
    /// entry and never abort the run.
    pub async fn run(&self) -> Result<RunOutcome, RunError> {
        if self.catalog.is_empty() {
            return Err(RunError::Config(CatalogError::Empty));
        }

        let mut state = RunState::new(self.catalog.len());
        tracing::info!(
            run = %state.run_id(),
            bugs = self.catalog.len(),
            root = %self.config.project_root.display(),
            "remediation run started"
        );

        // Snapshot the target tree; this is the only fatal I/O.
        let snapshot = SnapshotBuilder::new(&self.config.project_root)
            .with_ignored_file(file_name(&self.config.report_path))
            .with_ignored_file(file_name(&self.config.snapshot_path))
            .build()?;
        state.advance(RunPhase::SnapshotReady);
        self.observer
            .on_snapshot_ready(snapshot.file_count(), snapshot.char_count());

        // Persist the transient snapshot artifact; a failure here only
        // loses the on-disk copy, never the run.
        if let Err(e) = std::fs::write(&self.config.snapshot_path, snapshot.text()) {
            tracing::warn!(
                path = %self.config.snapshot_path.display(),
                error = %e,
                "could not persist snapshot artifact"
            );
        }

        let aggregator = ReportAggregator::new(self.catalog.ordering())
            .with_model(&self.config.model)
            .with_setting("Temperature", format!("{}", self.config.generation.temperature))
            .with_setting(
                "Max Output Tokens",
                self.config.generation.max_output_tokens.to_string(),
            )
            .with_setting("Max Attempts", self.config.max_attempts.to_string())
            .with_setting(
                "Attempt Timeout",
                format!("{}s", self.config.attempt_timeout.as_secs()),
            );

        let composer = PromptComposer::new();
        let generator = FixGenerator::new(Arc::clone(&self.service))
            .with_policy(self.config.retry_policy());
        let advisor = AdviceGenerator::new(Arc::clone(&self.service))
            .with_attempt_timeout(self.config.attempt_timeout);

        // Run-level timeout: a watchdog flips the cancellation signal so
        // the in-flight attempt aborts and remaining bugs fail fast.
        if let Some(timeout) = self.config.run_timeout {
            let tx = Arc::clone(&self.cancel_tx);
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                tracing::warn!(timeout_secs = timeout.as_secs(), "run timeout reached");
                let _ = tx.send(true);
            });
        }

        state.advance(RunPhase::Processing);
        let total = self.catalog.len();

        for (i, bug) in self.catalog.list_bugs().iter().enumerate() {
            let position = i + 1;
            let mut bug_phase = BugPhase::Pending;
            self.observer.on_bug_started(position, total, bug);
            tracing::info!(bug = %bug.id, position, total, "processing bug");

            debug_assert!(allowed_bug_transitions(bug_phase).contains(&BugPhase::InProgress));
            bug_phase = BugPhase::InProgress;

            let prompt = composer.compose(bug, &snapshot);
            let result = generator
                .generate_fix(bug, &prompt, &snapshot, self.cancel_rx.clone())
                .await;
            let solved = result.is_solved();
            let cancelled = matches!(
                result.verdict,
                FixVerdict::Failed {
                    last_outcome: AttemptOutcome::Cancelled
                }
            );

            let terminal = if solved {
                BugPhase::SolutionGenerated
            } else {
                BugPhase::Failed
            };
            debug_assert!(allowed_bug_transitions(bug_phase).contains(&terminal));
            bug_phase = terminal;
            tracing::debug!(bug = %bug.id, phase = ?bug_phase, "bug terminal");

            let entry = if solved {
                ReportEntry::from_bug(bug, result)
            } else if cancelled {
                // Straight to finalize; no advisory consult on cancellation.
                ReportEntry::from_bug(bug, result)
            } else {
                let detail = result
                    .attempts
                    .last()
                    .and_then(|a| a.detail.clone())
                    .unwrap_or_else(|| "attempts exhausted".to_string());
                let advice = advisor
                    .advise(bug, &detail, None, &snapshot)
                    .await
                    .unwrap_or_else(|| ADVICE_UNAVAILABLE.to_string());
                ReportEntry::from_bug(bug, result).with_advice(advice)
            };

            aggregator.record(entry);
            state.record_outcome(solved);
            self.observer
                .on_bug_finished(position, total, bug, solved, state.success_rate());
        }

        let report = aggregator.finalize();
        state.advance(RunPhase::ReportFinalized);

        let write_error = write_to_file(&report, &self.config.report_path).err();
        if let Some(e) = &write_error {
            tracing::error!(error = %e, "report persistence failed; in-memory report retained");
        }

        // The snapshot artifact is transient; drop it at run end.
        if self.config.snapshot_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.snapshot_path) {
                tracing::warn!(error = %e, "could not remove snapshot artifact");
            }
        }

        let totals = report.totals();
        self.observer.on_run_finished(&totals);
        tracing::info!(
            run = %state.run_id(),
            solved = totals.solved,
            failed = totals.failed,
            success_rate = totals.success_rate(),
            "remediation run finished"
        );

        Ok(RunOutcome {
            report,
            report_path: self.config.report_path.clone(),
            write_error,
        })
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
