//! Failure-advice pass
//!
//! When a bug exhausts its attempts, one additional consult of the service
//! asks for an analysis of why generation failed and an improved suggestion.
//! Advice is best-effort decoration of the report: any non-empty text is
//! taken as-is, failures degrade to a fixed placeholder, and nothing here
//! ever changes a bug's terminal result.

use crate::service::GenerativeService;
use remedy_catalog::BugDescriptor;
use remedy_snapshot::CodebaseSnapshot;
use std::sync::Arc;
use std::time::Duration;

/// Placeholder used when the advisory consult itself fails
pub const ADVICE_UNAVAILABLE: &str =
    "No failure analysis available: the advisory consult did not succeed.";

/// Generates a failure analysis for bugs that could not be solved
pub struct AdviceGenerator {
    service: Arc<dyn GenerativeService>,
    max_attempts: u32,
    attempt_timeout: Duration,
    retry_delay: Duration,
}

impl std::fmt::Debug for AdviceGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdviceGenerator")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl AdviceGenerator {
    /// Create an advice generator over the given service
    #[must_use]
    pub fn new(service: Arc<dyn GenerativeService>) -> Self {
        Self {
            service,
            max_attempts: 5,
            attempt_timeout: Duration::from_secs(45),
            retry_delay: Duration::from_secs(1),
        }
    }

    /// With a different attempt bound
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// With a different per-attempt timeout
    #[inline]
    #[must_use]
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// With a different delay between consults
    #[inline]
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Consult the service for a failure analysis
    ///
    /// Returns `None` when every consult fails or comes back empty; callers
    /// substitute [`ADVICE_UNAVAILABLE`].
    pub async fn advise(
        &self,
        bug: &BugDescriptor,
        failure_detail: &str,
        attempted_snippet: Option<&str>,
        snapshot: &CodebaseSnapshot,
    ) -> Option<String> {
        let prompt = self.advice_prompt(bug, failure_detail, attempted_snippet, snapshot);

        for attempt in 1..=self.max_attempts {
            match tokio::time::timeout(
                self.attempt_timeout,
                self.service.complete(&prompt, self.attempt_timeout),
            )
            .await
            {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    tracing::info!(bug = %bug.id, attempt, "failure analysis generated");
                    return Some(text.trim().to_string());
                }
                Ok(Ok(_)) => {
                    tracing::warn!(bug = %bug.id, attempt, "empty failure analysis");
                }
                Ok(Err(err)) => {
                    tracing::warn!(bug = %bug.id, attempt, error = %err, "advice consult failed");
                }
                Err(_) => {
                    tracing::warn!(bug = %bug.id, attempt, "advice consult timed out");
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        tracing::error!(bug = %bug.id, "failure analysis unavailable");
        None
    }

    fn advice_prompt(
        &self,
        bug: &BugDescriptor,
        failure_detail: &str,
        attempted_snippet: Option<&str>,
        snapshot: &CodebaseSnapshot,
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str(
            "An automated attempt to fix the defect below did not produce an accepted \
             code snippet. Analyze why the attempt failed and propose an improved, \
             concrete solution.\n\n",
        );
        prompt.push_str(&format!("BUG: {}\n", bug.title));
        prompt.push_str(&format!("DESCRIPTION: {}\n", bug.description));
        prompt.push_str(&format!("FAILURE: {failure_detail}\n\n"));

        match attempted_snippet {
            Some(snippet) if !snippet.trim().is_empty() => {
                prompt.push_str("PREVIOUS ATTEMPTED CODE:\n");
                prompt.push_str(snippet);
                prompt.push_str("\n\n");
            }
            _ => prompt.push_str("No code was produced in the previous attempts.\n\n"),
        }

        let mut any_context = false;
        for hint in &bug.file_hints {
            if let Some(section) = snapshot.file_section(hint) {
                if !any_context {
                    prompt.push_str("RELEVANT CONTEXT:\n");
                    any_context = true;
                }
                prompt.push_str(&format!("File: {hint}\n{section}\n\n"));
            }
        }

        prompt.push_str(
            "Respond with a short analysis of the failure followed by the corrected \
             code you would apply.\n",
        );
        prompt
    }
}
