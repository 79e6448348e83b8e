//! Remedy Core - run orchestration
//!
//! The orchestrator that drives registry -> composer -> generator ->
//! aggregator for every cataloged bug:
//! - Owns the run state machine and per-bug phase tracking
//! - Sequences bugs strictly (one service call in flight at a time)
//! - Absorbs per-bug failures into report entries; only snapshot and
//!   configuration errors abort a run
//! - Persists the transient snapshot artifact and removes it at run end
//! - Exposes progress to an external observer and supports cancellation

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod observer;
pub mod orchestrator;
pub mod state;

// Re-exports for convenience
pub use config::RunConfig;
pub use error::RunError;
pub use observer::{NullObserver, RunObserver};
pub use orchestrator::{Canceller, Orchestrator, RunOutcome};
pub use state::{BugPhase, RunId, RunPhase, RunState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
