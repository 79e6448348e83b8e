//! Remedy Snapshot - textual capture of a target source tree
//!
//! Builds the single immutable text blob a remediation run reasons over:
//! - Recursive walk of the target tree with dependency/build dirs excluded
//! - Deterministic lexicographic file ordering (byte-identical reruns)
//! - Per-file delimiters so downstream consumers can attribute spans
//! - Binary and unreadable files skipped, never fatal
//!
//! The snapshot is a value: captured once per run, read-only for the whole
//! run, discarded at run end.

#![warn(unreachable_pub)]

pub mod builder;
pub mod error;
pub mod snapshot;

// Re-exports for convenience
pub use builder::SnapshotBuilder;
pub use error::SnapshotError;
pub use snapshot::{CodebaseSnapshot, FILE_SEPARATOR, HEADER_LINE};
