//! Remedy Engine - fix generation against a generative service
//!
//! The heart of the remediation pipeline:
//! - Deterministic prompt composition from a bug descriptor and a snapshot
//! - A single-method [`GenerativeService`] capability with a Gemini-backed
//!   client, so tests substitute a scripted fake without any network
//! - Structural validation of candidate snippets (pluggable per-extension
//!   syntax checks, hint-set attribution, no-op echo guard)
//! - The bounded retry/backoff attempt loop producing one [`FixResult`]
//!   per bug
//! - A failure-advice pass consulted when a bug exhausts its attempts

#![warn(unreachable_pub)]

pub mod advice;
pub mod analysis;
pub mod attempt;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod service;
pub mod validate;

// Re-exports for convenience
pub use advice::{AdviceGenerator, ADVICE_UNAVAILABLE};
pub use attempt::{AttemptOutcome, FixAttempt, FixResult, FixVerdict};
pub use error::ServiceError;
pub use generator::{FixGenerator, RetryPolicy};
pub use prompt::{Prompt, PromptComposer};
pub use service::{GeminiClient, GenerationParams, GenerativeService, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use validate::{RejectionReason, SnippetValidator, SyntaxCheck, ValidatorRegistry};
