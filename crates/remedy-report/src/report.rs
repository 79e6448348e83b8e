//! The finalized run report

use crate::entry::ReportEntry;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use remedy_catalog::BugId;
use std::time::Duration;

/// Run-level aggregates
#[derive(Debug, Clone, Copy)]
pub struct RunTotals {
    /// Bugs processed
    pub total: usize,
    /// Bugs with a generated solution
    pub solved: usize,
    /// Bugs that exhausted their attempts
    pub failed: usize,
    /// Wall-clock time for the whole run
    pub elapsed: Duration,
}

impl RunTotals {
    /// Solution-generation success rate, as a percentage
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.solved as f64 / self.total as f64 * 100.0
        }
    }

    /// Whether every bug was solved
    #[inline]
    #[must_use]
    pub fn all_solved(&self) -> bool {
        self.failed == 0 && self.total > 0
    }
}

/// Ordered, aggregated outcome record for one remediation run
///
/// Entries are keyed by bug identifier in registry order. Immutable once
/// finalized; rendering and persistence read from this value.
#[derive(Debug, Clone)]
pub struct RunReport {
    entries: IndexMap<BugId, ReportEntry>,
    totals: RunTotals,
    finished_at: DateTime<Utc>,
    model: String,
    settings: Vec<(String, String)>,
}

impl RunReport {
    pub(crate) fn new(
        entries: IndexMap<BugId, ReportEntry>,
        totals: RunTotals,
        model: String,
        settings: Vec<(String, String)>,
    ) -> Self {
        Self {
            entries,
            totals,
            finished_at: Utc::now(),
            model,
            settings,
        }
    }

    /// Entries in registry order
    pub fn entries(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.values()
    }

    /// Look up one bug's entry
    #[must_use]
    pub fn get(&self, id: &BugId) -> Option<&ReportEntry> {
        self.entries.get(id)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run-level aggregates
    #[inline]
    #[must_use]
    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    /// Finalization timestamp
    #[inline]
    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Model the run was driven against
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Technical settings recorded for the report footer
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &[(String, String)] {
        &self.settings
    }
}
