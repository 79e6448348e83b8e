//! Remedy Catalog - the registry of known defects
//!
//! Holds the static catalog that drives a remediation run:
//! - Stable bug identifiers and category tags
//! - Per-bug symptom/root-cause descriptions and file-path hints
//! - Catalog-level validation (empty or duplicated entries are fatal)
//!
//! The catalog is loaded once at process start and never changes during a
//! run; downstream components treat descriptors as immutable values.

#![warn(unreachable_pub)]

pub mod descriptor;
pub mod error;
pub mod registry;

// Re-exports for convenience
pub use descriptor::{BugCategory, BugDescriptor, BugId};
pub use error::CatalogError;
pub use registry::BugCatalog;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
