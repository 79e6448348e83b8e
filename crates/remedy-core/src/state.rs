//! Run and per-bug state machines
//!
//! Transitions are validated; an illegal transition is a programming error
//! and panics in debug builds.

use ulid::Ulid;

/// Unique run identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phases of a remediation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Created, nothing captured yet
    Init,
    /// Snapshot built, processing not started
    SnapshotReady,
    /// Working through the catalog
    Processing,
    /// Report finalized; terminal
    ReportFinalized,
}

/// Phases of one bug inside a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BugPhase {
    /// Not yet started
    Pending,
    /// Attempt loop running
    InProgress,
    /// Terminal: a validated snippet was produced
    SolutionGenerated,
    /// Terminal: attempts exhausted or cancelled
    Failed,
}

/// Legal successor phases of a run phase
#[must_use]
pub fn allowed_run_transitions(from: RunPhase) -> Vec<RunPhase> {
    use RunPhase::*;
    match from {
        Init => vec![SnapshotReady],
        SnapshotReady => vec![Processing],
        Processing => vec![ReportFinalized],
        ReportFinalized => vec![],
    }
}

/// Legal successor phases of a bug phase
#[must_use]
pub fn allowed_bug_transitions(from: BugPhase) -> Vec<BugPhase> {
    use BugPhase::*;
    match from {
        Pending => vec![InProgress],
        InProgress => vec![SolutionGenerated, Failed],
        SolutionGenerated | Failed => vec![],
    }
}

/// Mutable run state, owned and mutated only by the orchestrator
#[derive(Debug)]
pub struct RunState {
    run_id: RunId,
    phase: RunPhase,
    total: usize,
    processed: usize,
    solved: usize,
}

impl RunState {
    /// Fresh state for a run over `total` bugs
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            run_id: RunId::new(),
            phase: RunPhase::Init,
            total,
            processed: 0,
            solved: 0,
        }
    }

    /// Run identifier
    #[inline]
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Advance to the next phase
    pub fn advance(&mut self, to: RunPhase) {
        debug_assert!(
            allowed_run_transitions(self.phase).contains(&to),
            "illegal run transition: {:?} -> {to:?}",
            self.phase
        );
        tracing::debug!(from = ?self.phase, to = ?to, "run phase transition");
        self.phase = to;
    }

    /// Record one bug's terminal outcome
    pub fn record_outcome(&mut self, solved: bool) {
        self.processed += 1;
        if solved {
            self.solved += 1;
        }
    }

    /// Bugs processed so far
    #[inline]
    #[must_use]
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Total bugs in the run
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Running solution-generation rate, as a percentage
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.solved as f64 / self.processed as f64 * 100.0
        }
    }
}
