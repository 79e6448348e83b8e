//! Error types for run orchestration
//!
//! Only run-aborting failures surface here. Per-attempt and per-bug errors
//! are absorbed into report entries and never raised past the orchestrator.

use remedy_catalog::CatalogError;
use remedy_snapshot::SnapshotError;

/// Fatal run errors
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Malformed or empty bug registry
    #[error("configuration error: {0}")]
    Config(#[from] CatalogError),

    /// Target tree could not be captured
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RunError::Config(CatalogError::Empty);
        assert!(err.to_string().contains("configuration error"));

        let err = RunError::Snapshot(SnapshotError::RootNotFound("/missing".into()));
        assert!(err.to_string().contains("snapshot error"));
    }
}
