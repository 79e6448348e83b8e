//! Attempt and result records
//!
//! One [`FixAttempt`] per round-trip to the generative service; one
//! [`FixResult`] per bug once its attempt loop terminates. Attempts are
//! strictly ordered and at most one per bug is accepted.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Classification of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttemptOutcome {
    /// Candidate passed the structural gate
    Accepted,
    /// Response received but failed structural validation
    RejectedMalformed,
    /// Transport or timeout failure
    TransportError,
    /// Service-level rate limiting
    RateLimited,
    /// Aborted by run-level cancellation
    Cancelled,
}

impl AttemptOutcome {
    /// Stable tag used in logs and reports
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            AttemptOutcome::Accepted => "accepted",
            AttemptOutcome::RejectedMalformed => "rejected-malformed",
            AttemptOutcome::TransportError => "transport-error",
            AttemptOutcome::RateLimited => "rate-limited",
            AttemptOutcome::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Record of one round-trip to the generative service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixAttempt {
    /// Attempt number, 1-based and strictly increasing per bug
    pub index: u32,
    /// Outcome classification
    pub outcome: AttemptOutcome,
    /// Wall-clock time spent on the attempt
    pub elapsed: Duration,
    /// Error or rejection detail, if any
    pub detail: Option<String>,
}

/// Terminal verdict for one bug
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FixVerdict {
    /// An attempt produced a validated snippet
    SolutionGenerated {
        /// The accepted snippet, verbatim
        snippet: String,
        /// Index of the winning attempt
        winning_attempt: u32,
    },
    /// Every attempt was consumed without acceptance
    Failed {
        /// Classification of the last attempt
        last_outcome: AttemptOutcome,
    },
}

/// Terminal outcome of the attempt loop for one bug
///
/// Immutable once created. Attempts are ordered by index; when the verdict
/// is `SolutionGenerated`, the winning attempt is the last one recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixResult {
    /// Ordered attempt records
    pub attempts: Vec<FixAttempt>,
    /// Terminal verdict
    pub verdict: FixVerdict,
    /// Total wall-clock time across all attempts
    pub elapsed: Duration,
}

impl FixResult {
    /// Whether a solution was generated
    #[inline]
    #[must_use]
    pub fn is_solved(&self) -> bool {
        matches!(self.verdict, FixVerdict::SolutionGenerated { .. })
    }

    /// Number of attempts consumed
    #[inline]
    #[must_use]
    pub fn attempt_count(&self) -> u32 {
        self.attempts.len() as u32
    }

    /// The accepted snippet, if any
    #[must_use]
    pub fn snippet(&self) -> Option<&str> {
        match &self.verdict {
            FixVerdict::SolutionGenerated { snippet, .. } => Some(snippet),
            FixVerdict::Failed { .. } => None,
        }
    }

    /// Classification of the final attempt
    #[must_use]
    pub fn last_outcome(&self) -> Option<AttemptOutcome> {
        self.attempts.last().map(|a| a.outcome)
    }
}
