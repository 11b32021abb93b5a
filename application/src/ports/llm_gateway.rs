//! LLM Gateway port
//!
//! Defines the interface for making one completion call to one provider.

use async_trait::async_trait;
use council_domain::{Credential, Model, Provider};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("No {} API key available for model {model}", provider.display_name())]
    MissingCredential { provider: Provider, model: String },

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Provider returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Whether retrying the same request may succeed.
    ///
    /// Connection failures, timeouts, 408, 429 and 5xx are transient.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::ConnectionError(_) | GatewayError::Timeout => true,
            GatewayError::HttpStatus { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            _ => false,
        }
    }

    /// Whether the failure stems from credentials or routing setup
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingCredential { .. } | GatewayError::ModelNotAvailable(_)
        )
    }
}

/// One completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: Model,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the provider for JSON-only output where it supports it
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn new(
        model: Model,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model,
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature: 0.3,
            max_tokens: 2000,
            json_mode: true,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

/// Provider reply to a [`CompletionRequest`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Completion {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to grading models.
/// Implementations (adapters) live in the infrastructure layer. The
/// credential is passed on every call; adapters must not keep it.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Perform a single completion call (no retries)
    async fn complete(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> Result<Completion, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::Timeout.is_transient());
        assert!(GatewayError::ConnectionError("reset".into()).is_transient());
        for status in [408, 429, 500, 502, 503] {
            let e = GatewayError::HttpStatus {
                status,
                message: String::new(),
            };
            assert!(e.is_transient(), "{status} should be transient");
        }
        for status in [400, 401, 403, 404] {
            let e = GatewayError::HttpStatus {
                status,
                message: String::new(),
            };
            assert!(!e.is_transient(), "{status} should not be transient");
        }
        assert!(!GatewayError::InvalidResponse("x".into()).is_transient());
    }

    #[test]
    fn test_missing_credential_is_configuration() {
        let e = GatewayError::MissingCredential {
            provider: Provider::Anthropic,
            model: "claude-3-5-sonnet-20241022".to_string(),
        };
        assert!(e.is_configuration());
        assert!(!e.is_transient());
        assert_eq!(
            e.to_string(),
            "No Anthropic API key available for model claude-3-5-sonnet-20241022"
        );
    }
}
