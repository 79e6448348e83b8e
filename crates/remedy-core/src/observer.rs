//! Progress observation seam
//!
//! The orchestrator reports run-level progress through this trait; the
//! console reporter in the binary is one implementation, tests another.

use remedy_catalog::BugDescriptor;
use remedy_report::RunTotals;

/// Observer of run progress
///
/// All methods default to no-ops so implementations pick what they need.
pub trait RunObserver: Send + Sync {
    /// Snapshot captured
    fn on_snapshot_ready(&self, _files: usize, _chars: usize) {}

    /// Bug `position` of `total` started
    fn on_bug_started(&self, _position: usize, _total: usize, _bug: &BugDescriptor) {}

    /// Bug `position` of `total` reached a terminal phase
    fn on_bug_finished(
        &self,
        _position: usize,
        _total: usize,
        _bug: &BugDescriptor,
        _solved: bool,
        _running_success_rate: f64,
    ) {
    }

    /// Report finalized
    fn on_run_finished(&self, _totals: &RunTotals) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_observer_is_callable() {
        let observer = NullObserver;
        let catalog = remedy_catalog::BugCatalog::reference();
        observer.on_snapshot_ready(3, 120);
        observer.on_bug_started(1, 5, &catalog.list_bugs()[0]);
        observer.on_bug_finished(1, 5, &catalog.list_bugs()[0], true, 100.0);
    }
}
