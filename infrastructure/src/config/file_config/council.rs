//! Council configuration from TOML (`[council]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [council]
//! models = ["gpt-4o", "claude-3-5-sonnet-20241022", "gemini/gemini-1.5-pro"]
//! agreement_threshold = 0.8
//! temperature = 0.3
//! max_tokens = 2000
//! call_timeout_secs = 120    # 0 disables the per-call timeout
//! max_attempts = 3
//! initial_backoff_ms = 1000
//! max_backoff_ms = 10000
//! ```

use council_application::{ExecutionParams, RetryPolicy};
use council_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw `[council]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Grading models, in dispatch order
    pub models: Vec<String>,
    pub agreement_threshold: f64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub call_timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        let execution = ExecutionParams::default();
        Self {
            models: Model::default_models()
                .iter()
                .map(|m| m.to_string())
                .collect(),
            agreement_threshold: 0.8,
            temperature: execution.temperature,
            max_tokens: execution.max_tokens,
            call_timeout_secs: execution.call_timeout.map_or(0, |t| t.as_secs()),
            max_attempts: execution.retry.max_attempts,
            initial_backoff_ms: execution.retry.initial_backoff.as_millis() as u64,
            max_backoff_ms: execution.retry.max_backoff.as_millis() as u64,
        }
    }
}

impl FileCouncilConfig {
    /// Parse model names, skipping blank entries
    pub fn parse_models(&self) -> Vec<Model> {
        self.models
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Model::from)
            .collect()
    }

    /// Build execution parameters for the invocation client
    pub fn execution_params(&self) -> ExecutionParams {
        let call_timeout =
            (self.call_timeout_secs > 0).then(|| Duration::from_secs(self.call_timeout_secs));
        let retry = RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_backoff(
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            );

        ExecutionParams::default()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_call_timeout(call_timeout)
            .with_retry(retry)
    }
}
