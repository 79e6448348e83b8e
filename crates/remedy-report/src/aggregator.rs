//! Report aggregator
//!
//! Collects entries as bugs finish, in whatever order they finish, and
//! re-sorts into registry order at finalization. The append path is
//! single-writer: a mutex guards the one shared mutable structure so a
//! parallelized pipeline can record safely.

use crate::entry::ReportEntry;
use crate::report::{RunReport, RunTotals};
use indexmap::IndexMap;
use parking_lot::Mutex;
use remedy_catalog::BugId;
use std::time::Instant;

/// Incrementally collects per-bug outcomes into a [`RunReport`]
#[derive(Debug)]
pub struct ReportAggregator {
    ordering: Vec<BugId>,
    model: String,
    settings: Vec<(String, String)>,
    entries: Mutex<IndexMap<BugId, ReportEntry>>,
    started: Instant,
}

impl ReportAggregator {
    /// Create an aggregator for the given registry ordering
    #[must_use]
    pub fn new(ordering: Vec<BugId>) -> Self {
        Self {
            ordering,
            model: "unknown".to_string(),
            settings: Vec::new(),
            entries: Mutex::new(IndexMap::new()),
            started: Instant::now(),
        }
    }

    /// With the model name recorded in the report header
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With a technical setting for the report footer
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.push((key.into(), value.into()));
        self
    }

    /// Append one bug's entry
    ///
    /// Recording the same bug twice replaces the earlier entry; recording a
    /// bug outside the registry ordering is kept but logged, and lands after
    /// the ordered entries.
    pub fn record(&self, entry: ReportEntry) {
        let mut entries = self.entries.lock();
        if !self.ordering.contains(&entry.bug_id) {
            tracing::warn!(bug = %entry.bug_id, "recording entry for unregistered bug");
        }
        if entries.insert(entry.bug_id.clone(), entry).is_some() {
            tracing::warn!("replaced an already-recorded entry");
        }
    }

    /// Number of entries recorded so far
    #[must_use]
    pub fn recorded(&self) -> usize {
        self.entries.lock().len()
    }

    /// Running count of solved bugs
    #[must_use]
    pub fn solved(&self) -> usize {
        self.entries.lock().values().filter(|e| e.is_solved()).count()
    }

    /// Compute aggregates and produce the finalized report
    ///
    /// Entries are re-sorted into registry order regardless of the order
    /// they were recorded in.
    #[must_use]
    pub fn finalize(&self) -> RunReport {
        let recorded = self.entries.lock().clone();

        let mut ordered = IndexMap::with_capacity(recorded.len());
        for id in &self.ordering {
            if let Some(entry) = recorded.get(id) {
                ordered.insert(id.clone(), entry.clone());
            }
        }
        // Entries outside the registry ordering keep their recording order.
        for (id, entry) in recorded {
            if !ordered.contains_key(&id) {
                ordered.insert(id, entry);
            }
        }

        let solved = ordered.values().filter(|e| e.is_solved()).count();
        let total = ordered.len();
        let totals = RunTotals {
            total,
            solved,
            failed: total - solved,
            elapsed: self.started.elapsed(),
        };

        tracing::info!(
            total,
            solved,
            failed = totals.failed,
            "report finalized"
        );

        RunReport::new(ordered, totals, self.model.clone(), self.settings.clone())
    }
}
