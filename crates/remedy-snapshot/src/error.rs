//! Error types for snapshot construction
//!
//! Snapshot errors are run-aborting: nothing downstream can proceed without
//! a capture of the target tree. Per-file read problems are NOT errors at
//! this level; the builder logs and skips them.

use std::path::PathBuf;

/// Snapshot construction errors
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Target root does not exist or is not a directory
    #[error("target root not found: {0}")]
    RootNotFound(PathBuf),

    /// Walk finished without a single readable text file
    #[error("no readable files under {0}")]
    NoReadableFiles(PathBuf),

    /// Walk itself failed (permissions, dangling root)
    #[error("failed to walk {path}: {source}")]
    Walk {
        /// Root being walked
        path: PathBuf,
        /// Underlying error
        #[source]
        source: walkdir::Error,
    },
}
