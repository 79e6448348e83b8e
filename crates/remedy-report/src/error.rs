//! Error types for report persistence
//!
//! A failed write is recoverable: the in-memory [`crate::RunReport`] stays
//! available to the caller and the failure is reported at run level.

use std::path::PathBuf;

/// Report persistence errors
#[derive(Debug, thiserror::Error)]
pub enum ReportWriteError {
    /// Destination could not be written
    #[error("failed to write report to {path}: {source}")]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}
