//! The retrying fix generator
//!
//! Drives the bounded attempt loop for one bug: call the service under a
//! per-attempt timeout, classify the response, validate the candidate, and
//! back off exponentially between non-accepted attempts. The loop is an
//! explicit indexed iteration so the attempt-count invariants stay easy to
//! assert in tests.

use crate::attempt::{AttemptOutcome, FixAttempt, FixResult, FixVerdict};
use crate::error::ServiceError;
use crate::prompt::Prompt;
use crate::service::GenerativeService;
use crate::validate::SnippetValidator;
use rand::Rng;
use remedy_catalog::BugDescriptor;
use remedy_snapshot::CodebaseSnapshot;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Retry/backoff policy for the attempt loop
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts per bug
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles per attempt
    pub base_delay: Duration,
    /// Backoff cap
    pub max_delay: Duration,
    /// Per-attempt timeout on the service call
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            attempt_timeout: Duration::from_secs(45),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given attempt (1-based)
    ///
    /// Doubles per attempt, capped at `max_delay`, with 0.9-1.1 jitter.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = 2u32.saturating_pow(attempt.saturating_sub(1)).min(1 << 16);
        let base = self
            .base_delay
            .saturating_mul(exp)
            .min(self.max_delay)
            .as_millis() as f64;
        let jitter = rand::rng().random_range(0.9..1.1);
        Duration::from_millis((base * jitter) as u64)
    }
}

/// Resolves when the cancellation signal fires; never resolves otherwise
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender dropped without cancelling; nothing to wait for.
            futures::future::pending::<()>().await;
        }
    }
}

/// Generates one validated fix per bug against the generative service
pub struct FixGenerator {
    service: Arc<dyn GenerativeService>,
    validator: SnippetValidator,
    policy: RetryPolicy,
}

impl std::fmt::Debug for FixGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixGenerator")
            .field("policy", &self.policy)
            .finish()
    }
}

impl FixGenerator {
    /// Create a generator over the given service
    #[must_use]
    pub fn new(service: Arc<dyn GenerativeService>) -> Self {
        Self {
            service,
            validator: SnippetValidator::new(),
            policy: RetryPolicy::default(),
        }
    }

    /// With a different retry policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// With a different validator
    #[inline]
    #[must_use]
    pub fn with_validator(mut self, validator: SnippetValidator) -> Self {
        self.validator = validator;
        self
    }

    /// The active retry policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run the attempt loop for one bug
    ///
    /// Terminates immediately on the first accepted candidate; otherwise
    /// consumes exactly `max_attempts` attempts and reports the last
    /// classification. Cancellation aborts the in-flight call and yields a
    /// `cancelled` failure. Never returns an error: per-bug failures are
    /// absorbed into the result.
    pub async fn generate_fix(
        &self,
        bug: &BugDescriptor,
        prompt: &Prompt,
        snapshot: &CodebaseSnapshot,
        mut cancel: watch::Receiver<bool>,
    ) -> FixResult {
        let started = Instant::now();
        let mut attempts: Vec<FixAttempt> = Vec::new();

        for attempt in 1..=self.policy.max_attempts {
            if *cancel.borrow() {
                return self.cancelled_result(bug, attempts, started, attempt);
            }

            let attempt_started = Instant::now();
            tracing::info!(
                bug = %bug.id,
                attempt,
                max = self.policy.max_attempts,
                "calling generative service"
            );

            let call = tokio::time::timeout(
                self.policy.attempt_timeout,
                self.service.complete(prompt.text(), self.policy.attempt_timeout),
            );

            let (outcome, detail, snippet) = tokio::select! {
                () = cancelled(&mut cancel) => {
                    attempts.push(FixAttempt {
                        index: attempt,
                        outcome: AttemptOutcome::Cancelled,
                        elapsed: attempt_started.elapsed(),
                        detail: Some("run cancelled".to_string()),
                    });
                    return self.cancelled_result(bug, attempts, started, attempt + 1);
                }
                result = call => match result {
                    Err(_) => {
                        let err = ServiceError::Timeout(self.policy.attempt_timeout);
                        (AttemptOutcome::TransportError, Some(err.to_string()), None)
                    }
                    Ok(Err(err)) => (err.classify(), Some(err.to_string()), None),
                    Ok(Ok(raw)) => match self.validator.validate(&raw, bug, snapshot) {
                        Ok(()) => (AttemptOutcome::Accepted, None, Some(raw)),
                        Err(reason) => {
                            (AttemptOutcome::RejectedMalformed, Some(reason.to_string()), None)
                        }
                    },
                },
            };

            attempts.push(FixAttempt {
                index: attempt,
                outcome,
                elapsed: attempt_started.elapsed(),
                detail: detail.clone(),
            });

            if let Some(snippet) = snippet {
                tracing::info!(bug = %bug.id, attempt, "candidate accepted");
                return FixResult {
                    attempts,
                    verdict: FixVerdict::SolutionGenerated {
                        snippet,
                        winning_attempt: attempt,
                    },
                    elapsed: started.elapsed(),
                };
            }

            tracing::warn!(
                bug = %bug.id,
                attempt,
                outcome = %outcome,
                detail = detail.as_deref().unwrap_or(""),
                "attempt not accepted"
            );

            // No delay after the final attempt.
            if attempt < self.policy.max_attempts {
                let delay = self.policy.backoff(attempt);
                tokio::select! {
                    () = cancelled(&mut cancel) => {
                        return self.cancelled_result(bug, attempts, started, attempt + 1);
                    }
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }

        let last_outcome = attempts
            .last()
            .map_or(AttemptOutcome::TransportError, |a| a.outcome);
        tracing::error!(
            bug = %bug.id,
            attempts = attempts.len(),
            last = %last_outcome,
            "attempts exhausted without acceptance"
        );

        FixResult {
            attempts,
            verdict: FixVerdict::Failed { last_outcome },
            elapsed: started.elapsed(),
        }
    }

    fn cancelled_result(
        &self,
        bug: &BugDescriptor,
        attempts: Vec<FixAttempt>,
        started: Instant,
        at_attempt: u32,
    ) -> FixResult {
        tracing::warn!(bug = %bug.id, attempt = at_attempt, "fix generation cancelled");
        FixResult {
            attempts,
            verdict: FixVerdict::Failed {
                last_outcome: AttemptOutcome::Cancelled,
            },
            elapsed: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptComposer;
    use async_trait::async_trait;
    use remedy_catalog::{BugCategory, BugDescriptor};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct CallCounter(AtomicU32);

    impl CallCounter {
        fn increment(&self) -> u32 {
            self.0.fetch_add(1, Ordering::SeqCst) + 1
        }

        fn get(&self) -> u32 {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Scripted fake service: pops one reply per call, repeats the last
    struct ScriptedService {
        replies: Mutex<Vec<Result<String, ServiceError>>>,
        calls: CallCounter,
    }

    impl ScriptedService {
        fn new(replies: Vec<Result<String, ServiceError>>) -> Self {
            let mut replies = replies;
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: CallCounter::default(),
            }
        }
    }

    #[async_trait]
    impl GenerativeService for ScriptedService {
        async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ServiceError> {
            self.calls.increment();
            let mut replies = self.replies.lock().unwrap();
            match replies.len() {
                0 => Err(ServiceError::Transport("script exhausted".into())),
                1 => clone_reply(&replies[0]),
                _ => replies.pop().unwrap(),
            }
        }
    }

    fn clone_reply(reply: &Result<String, ServiceError>) -> Result<String, ServiceError> {
        match reply {
            Ok(s) => Ok(s.clone()),
            Err(ServiceError::RateLimited) => Err(ServiceError::RateLimited),
            Err(ServiceError::Timeout(d)) => Err(ServiceError::Timeout(*d)),
            Err(ServiceError::Status { status }) => Err(ServiceError::Status { status: *status }),
            Err(ServiceError::Payload(s)) => Err(ServiceError::Payload(s.clone())),
            Err(ServiceError::Transport(s)) => Err(ServiceError::Transport(s.clone())),
        }
    }

    const ORIGINAL: &str = "export const apiCall = async (method: string) => {\n  return fetch('/api');\n};\n";

    fn bug() -> BugDescriptor {
        BugDescriptor::new("csrf-token-header", "CSRF header", BugCategory::SecurityHeader)
            .with_description("desc")
            .with_file_hints(["frontend/src/services/api.ts"])
    }

    fn snapshot() -> CodebaseSnapshot {
        CodebaseSnapshot::from_framed_text(
            CodebaseSnapshot::frame_file("frontend/src/services/api.ts", ORIGINAL),
            1,
        )
    }

    fn good_reply() -> String {
        "File: frontend/src/services/api.ts\n\
         ```typescript\n\
         headers['X-CSRFToken'] = getCookie('csrftoken');\n\
         ```\n\
         Rationale: attach the CSRF token on mutating requests.\n"
            .to_string()
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            attempt_timeout: Duration::from_secs(5),
        }
    }

    fn generator(service: Arc<ScriptedService>) -> FixGenerator {
        FixGenerator::new(service).with_policy(fast_policy())
    }

    fn no_cancel() -> watch::Receiver<bool> {
        // Dropping the sender is fine: a closed channel never cancels.
        let (_tx, rx) = watch::channel(false);
        rx
    }

    #[tokio::test]
    async fn accepts_on_first_attempt() {
        let service = Arc::new(ScriptedService::new(vec![Ok(good_reply())]));
        let generator = generator(service.clone());

        let bug = bug();
        let snapshot = snapshot();
        let prompt = PromptComposer::new().compose(&bug, &snapshot);
        let result = generator.generate_fix(&bug, &prompt, &snapshot, no_cancel()).await;

        assert!(result.is_solved());
        assert_eq!(result.attempt_count(), 1);
        assert_eq!(service.calls.get(), 1);
    }

    #[tokio::test]
    async fn early_termination_on_second_attempt() {
        let service = Arc::new(ScriptedService::new(vec![
            Ok("not a snippet at all".to_string()),
            Ok(good_reply()),
        ]));
        let generator = generator(service.clone());

        let bug = bug();
        let snapshot = snapshot();
        let prompt = PromptComposer::new().compose(&bug, &snapshot);
        let result = generator.generate_fix(&bug, &prompt, &snapshot, no_cancel()).await;

        assert!(result.is_solved());
        assert_eq!(result.attempt_count(), 2);
        assert_eq!(service.calls.get(), 2);
        match result.verdict {
            FixVerdict::SolutionGenerated { winning_attempt, .. } => {
                assert_eq!(winning_attempt, 2);
            }
            FixVerdict::Failed { .. } => panic!("expected a solution"),
        }
    }

    #[tokio::test]
    async fn exhaustion_bound_on_persistent_malformed() {
        let service = Arc::new(ScriptedService::new(vec![Ok("garbage".to_string())]));
        let generator = generator(service.clone());

        let bug = bug();
        let snapshot = snapshot();
        let prompt = PromptComposer::new().compose(&bug, &snapshot);
        let result = generator.generate_fix(&bug, &prompt, &snapshot, no_cancel()).await;

        assert!(!result.is_solved());
        assert_eq!(result.attempt_count(), 5);
        assert_eq!(service.calls.get(), 5);
        assert!(matches!(
            result.verdict,
            FixVerdict::Failed { last_outcome: AttemptOutcome::RejectedMalformed }
        ));
    }

    #[tokio::test]
    async fn rate_limit_then_acceptance() {
        let service = Arc::new(ScriptedService::new(vec![
            Err(ServiceError::RateLimited),
            Err(ServiceError::Transport("refused".into())),
            Ok(good_reply()),
        ]));
        let generator = generator(service.clone());

        let bug = bug();
        let snapshot = snapshot();
        let prompt = PromptComposer::new().compose(&bug, &snapshot);
        let result = generator.generate_fix(&bug, &prompt, &snapshot, no_cancel()).await;

        assert!(result.is_solved());
        assert_eq!(result.attempt_count(), 3);
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::RateLimited);
        assert_eq!(result.attempts[1].outcome, AttemptOutcome::TransportError);
        assert_eq!(result.attempts[2].outcome, AttemptOutcome::Accepted);
    }

    #[tokio::test]
    async fn attempt_indices_are_strictly_increasing() {
        let service = Arc::new(ScriptedService::new(vec![Ok("junk".to_string())]));
        let generator = generator(service);

        let bug = bug();
        let snapshot = snapshot();
        let prompt = PromptComposer::new().compose(&bug, &snapshot);
        let result = generator.generate_fix(&bug, &prompt, &snapshot, no_cancel()).await;

        let indices: Vec<u32> = result.attempts.iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn cancellation_before_first_attempt() {
        let service = Arc::new(ScriptedService::new(vec![Ok(good_reply())]));
        let generator = generator(service.clone());

        let (tx, rx) = watch::channel(true);
        let bug = bug();
        let snapshot = snapshot();
        let prompt = PromptComposer::new().compose(&bug, &snapshot);
        let result = generator.generate_fix(&bug, &prompt, &snapshot, rx).await;
        drop(tx);

        assert!(!result.is_solved());
        assert_eq!(service.calls.get(), 0);
        assert!(matches!(
            result.verdict,
            FixVerdict::Failed { last_outcome: AttemptOutcome::Cancelled }
        ));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(450),
            attempt_timeout: Duration::from_secs(5),
        };

        // Jitter is ±10%, so compare against generous bounds.
        let first = policy.backoff(1);
        assert!(first >= Duration::from_millis(85) && first <= Duration::from_millis(115));

        let second = policy.backoff(2);
        assert!(second >= Duration::from_millis(175) && second <= Duration::from_millis(225));

        let capped = policy.backoff(4);
        assert!(capped <= Duration::from_millis(500));
    }
}
