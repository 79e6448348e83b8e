//! Error types for generative-service calls
//!
//! Every variant is per-attempt and recoverable: the fix generator absorbs
//! these into attempt outcomes and retries with backoff. Nothing here is
//! ever raised past the orchestrator.

use crate::attempt::AttemptOutcome;
use std::time::Duration;

/// Failures of a single call to the generative service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Connection-level failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// The call exceeded its per-attempt timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The service signalled rate limiting
    #[error("service rate limited")]
    RateLimited,

    /// The service answered with a non-success status
    #[error("service returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be decoded
    #[error("malformed service payload: {0}")]
    Payload(String),
}

impl ServiceError {
    /// Classify the failure as an attempt outcome
    #[inline]
    #[must_use]
    pub fn classify(&self) -> AttemptOutcome {
        match self {
            ServiceError::RateLimited => AttemptOutcome::RateLimited,
            ServiceError::Transport(_)
            | ServiceError::Timeout(_)
            | ServiceError::Status { .. }
            | ServiceError::Payload(_) => AttemptOutcome::TransportError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(ServiceError::RateLimited.classify(), AttemptOutcome::RateLimited);
        assert_eq!(
            ServiceError::Transport("refused".into()).classify(),
            AttemptOutcome::TransportError
        );
        assert_eq!(
            ServiceError::Timeout(Duration::from_secs(45)).classify(),
            AttemptOutcome::TransportError
        );
        assert_eq!(
            ServiceError::Status { status: 503 }.classify(),
            AttemptOutcome::TransportError
        );
    }

    #[test]
    fn error_display() {
        let err = ServiceError::Status { status: 429 };
        assert!(err.to_string().contains("429"));
    }
}
