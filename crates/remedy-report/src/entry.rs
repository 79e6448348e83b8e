//! Per-bug report entries

use remedy_catalog::{BugCategory, BugDescriptor, BugId};
use remedy_engine::FixResult;
use serde::{Deserialize, Serialize};

/// One bug's line in the run report
///
/// Carries the descriptor's diagnosis fields alongside the terminal result
/// so the rendered report is self-contained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Bug identifier
    pub bug_id: BugId,
    /// Bug title
    pub title: String,
    /// Category tag
    pub category: BugCategory,
    /// Suspected root cause, from the descriptor
    pub root_cause: String,
    /// Fix concept, from the descriptor
    pub fix_concept: String,
    /// File hints, from the descriptor
    pub files: Vec<String>,
    /// Terminal result of the attempt loop
    pub result: FixResult,
    /// Failure analysis, present only for failed bugs
    pub advice: Option<String>,
}

impl ReportEntry {
    /// Build an entry from a descriptor and its terminal result
    #[must_use]
    pub fn from_bug(bug: &BugDescriptor, result: FixResult) -> Self {
        Self {
            bug_id: bug.id.clone(),
            title: bug.title.clone(),
            category: bug.category,
            root_cause: bug.root_cause.clone(),
            fix_concept: bug.fix_concept.clone(),
            files: bug.file_hints.clone(),
            result,
            advice: None,
        }
    }

    /// Attach a failure analysis
    #[inline]
    #[must_use]
    pub fn with_advice(mut self, advice: impl Into<String>) -> Self {
        self.advice = Some(advice.into());
        self
    }

    /// Whether this bug was solved
    #[inline]
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.result.is_solved()
    }
}
