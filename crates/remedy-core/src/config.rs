//! Run configuration
//!
//! One explicit value threaded through the orchestrator; no ambient
//! globals. Defaults mirror the reference deployment: five attempts,
//! 45-second attempt timeout, Gemini flash model.

use remedy_engine::{GenerationParams, RetryPolicy};
use std::path::PathBuf;
use std::time::Duration;

/// Default file name for the persisted report
pub const DEFAULT_REPORT_FILE: &str = "remediation_report.txt";

/// Default file name for the transient snapshot artifact
pub const DEFAULT_SNAPSHOT_FILE: &str = "codebase_snapshot.txt";

/// Configuration for one remediation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root of the target source tree
    pub project_root: PathBuf,
    /// Destination of the rendered report
    pub report_path: PathBuf,
    /// Destination of the transient snapshot text
    pub snapshot_path: PathBuf,
    /// Model identifier recorded in the report
    pub model: String,
    /// Attempt bound per bug
    pub max_attempts: u32,
    /// Per-attempt timeout on service calls
    pub attempt_timeout: Duration,
    /// Backoff before the second attempt
    pub base_delay: Duration,
    /// Backoff cap
    pub max_delay: Duration,
    /// Optional wall-clock bound for the whole run
    pub run_timeout: Option<Duration>,
    /// Sampling parameters recorded in the report
    pub generation: GenerationParams,
}

impl RunConfig {
    /// Configuration rooted at the given target tree
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            report_path: project_root.join(DEFAULT_REPORT_FILE),
            snapshot_path: project_root.join(DEFAULT_SNAPSHOT_FILE),
            project_root,
            model: remedy_engine::DEFAULT_MODEL.to_string(),
            max_attempts: 5,
            attempt_timeout: Duration::from_secs(45),
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            run_timeout: None,
            generation: GenerationParams::default(),
        }
    }

    /// With a different report destination
    #[inline]
    #[must_use]
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    /// With a different model identifier
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
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

    /// With different backoff delays
    #[inline]
    #[must_use]
    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_delay = base;
        self.max_delay = max;
        self
    }

    /// With a run-level timeout
    #[inline]
    #[must_use]
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    /// The retry policy this configuration implies
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            attempt_timeout: self.attempt_timeout,
        }
    }

    /// Resolve the service API key from the environment
    ///
    /// Checks `GEMINI_API_KEY` then `GOOGLE_API_KEY`. A missing key is a
    /// startup-fatal configuration problem for the binary.
    #[must_use]
    pub fn resolve_api_key() -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RunConfig::new("/tmp/project");

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.attempt_timeout, Duration::from_secs(45));
        assert!(config.run_timeout.is_none());
        assert!(config.report_path.ends_with(DEFAULT_REPORT_FILE));
        assert!(config.snapshot_path.ends_with(DEFAULT_SNAPSHOT_FILE));
    }

    #[test]
    fn builder_overrides() {
        let config = RunConfig::new("/tmp/project")
            .with_model("gemini-test")
            .with_max_attempts(3)
            .with_run_timeout(Duration::from_secs(120));

        assert_eq!(config.model, "gemini-test");
        assert_eq!(config.retry_policy().max_attempts, 3);
        assert_eq!(config.run_timeout, Some(Duration::from_secs(120)));
    }
}
