//! Execution parameters: per-call model invocation control.
//!
//! [`ExecutionParams`] groups the static parameters every grading call in a
//! council run uses. These are application-layer concerns, not domain policy.

use super::retry_policy::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model invocation parameters shared by both council rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Sampling temperature for grading calls.
    pub temperature: f32,
    /// Maximum completion tokens per grading call.
    pub max_tokens: u32,
    /// Upper bound on a single attempt. `None` disables the timeout.
    pub call_timeout: Option<Duration>,
    /// Retry/backoff for transient provider errors.
    pub retry: RetryPolicy,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 2000,
            call_timeout: Some(Duration::from_secs(120)),
            retry: RetryPolicy::default(),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
