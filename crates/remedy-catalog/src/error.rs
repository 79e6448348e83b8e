//! Error types for the bug catalog
//!
//! Catalog errors are startup-fatal configuration errors: a run never begins
//! against a malformed registry.

use crate::descriptor::BugId;

/// Catalog validation errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Catalog has no entries
    #[error("catalog is empty")]
    Empty,

    /// Two entries share an identifier
    #[error("duplicate bug id: {0}")]
    DuplicateId(BugId),

    /// Entry is missing required descriptive text
    #[error("bug {id} is missing its {field}")]
    MissingField {
        /// Offending entry
        id: BugId,
        /// Name of the empty field
        field: &'static str,
    },
}
