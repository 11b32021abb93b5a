//! Model invocation client
//!
//! Makes one scoring call to one grading model with bounded retry, a per
//! attempt timeout and cooperative cancellation.

use crate::config::ExecutionParams;
use crate::ports::llm_gateway::{Completion, CompletionRequest, GatewayError, LlmGateway};
use council_domain::{Credential, GradingRound, ParseError};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Why one (model, round) pair produced no result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradeError {
    /// The credential or routing cannot serve this model. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider failure: non-transient, or transient after every attempt
    #[error("Provider error after {attempts} attempt(s): {source}")]
    Provider {
        attempts: u32,
        #[source]
        source: GatewayError,
    },

    #[error("Timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("Failed to parse grading response: {0}")]
    Parse(#[from] ParseError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl GradeError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GradeError::Cancelled)
    }

    fn from_gateway(error: GatewayError, attempts: u32) -> Self {
        match error {
            e if e.is_configuration() => GradeError::Configuration(e.to_string()),
            GatewayError::Timeout => GradeError::Timeout { attempts },
            source => GradeError::Provider { attempts, source },
        }
    }
}

/// Successful invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub completion: Completion,
    /// Wall time of the successful attempt
    pub latency_ms: u64,
    pub attempts: u32,
}

/// Retrying client over an [`LlmGateway`]
pub struct ModelInvoker<G: LlmGateway + ?Sized> {
    gateway: Arc<G>,
    params: ExecutionParams,
}

impl<G: LlmGateway + ?Sized> Clone for ModelInvoker<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            params: self.params.clone(),
        }
    }
}

impl<G: LlmGateway + ?Sized> ModelInvoker<G> {
    pub fn new(gateway: Arc<G>, params: ExecutionParams) -> Self {
        Self { gateway, params }
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    /// Invoke the model, retrying transient failures with backoff.
    ///
    /// Provider resolution belongs to the gateway. A credential lacking the
    /// key it needs comes back as [`GatewayError::MissingCredential`], which
    /// maps to [`GradeError::Configuration`] without retry.
    pub async fn invoke(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
        round: GradingRound,
        cancellation: &CancellationToken,
    ) -> Result<Invocation, GradeError> {
        let policy = &self.params.retry;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let started = Instant::now();

            let outcome = tokio::select! {
                biased;
                _ = cancellation.cancelled() => return Err(GradeError::Cancelled),
                outcome = self.attempt(request, credential) => outcome,
            };

            let error = match outcome {
                Ok(completion) => {
                    let latency_ms = started.elapsed().as_millis() as u64;
                    debug!(
                        model = %request.model,
                        round = round.number(),
                        attempt,
                        latency_ms,
                        "Model call succeeded"
                    );
                    return Ok(Invocation {
                        completion,
                        latency_ms,
                        attempts: attempt,
                    });
                }
                Err(e) => e,
            };

            if !error.is_transient() || !policy.should_retry(attempt) {
                return Err(GradeError::from_gateway(error, attempt));
            }

            let backoff = policy.backoff_for(attempt);
            warn!(
                model = %request.model,
                round = round.number(),
                attempt,
                max_attempts = policy.max_attempts,
                backoff_ms = backoff.as_millis() as u64,
                error = %error,
                "Transient provider error, retrying"
            );

            tokio::select! {
                biased;
                _ = cancellation.cancelled() => return Err(GradeError::Cancelled),
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }

    async fn attempt(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> Result<Completion, GatewayError> {
        let call = self.gateway.complete(request, credential);
        match self.params.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::Timeout)?,
            None => call.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use async_trait::async_trait;
    use council_domain::{KeySource, Model, Provider};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Gateway that replays scripted outcomes and counts calls
    struct ScriptedGateway {
        outcomes: Mutex<VecDeque<Result<Completion, GatewayError>>>,
        calls: Mutex<u32>,
        delay: Option<Duration>,
    }

    impl ScriptedGateway {
        fn new(outcomes: Vec<Result<Completion, GatewayError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(0),
                delay: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn complete(
            &self,
            _request: &CompletionRequest,
            _credential: &Credential,
        ) -> Result<Completion, GatewayError> {
            *self.calls.lock().unwrap() += 1;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Other("script exhausted".into())))
        }
    }

    fn ok(content: &str) -> Result<Completion, GatewayError> {
        Ok(Completion {
            content: content.to_string(),
            prompt_tokens: 10,
            completion_tokens: 5,
        })
    }

    fn unavailable() -> Result<Completion, GatewayError> {
        Err(GatewayError::HttpStatus {
            status: 503,
            message: "overloaded".into(),
        })
    }

    fn credential() -> Credential {
        Credential::new(KeySource::PlatformShared)
            .with_key(Provider::OpenAi, "sk-test")
            .with_key(Provider::Anthropic, "sk-ant-test")
            .with_key(Provider::Google, "g-test")
    }

    fn invoker(gateway: Arc<ScriptedGateway>) -> ModelInvoker<ScriptedGateway> {
        let params = ExecutionParams::default().with_retry(
            RetryPolicy::default().with_backoff(Duration::from_millis(1), Duration::from_millis(5)),
        );
        ModelInvoker::new(gateway, params)
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(Model::Gpt4o, "system", "user")
    }

    #[tokio::test]
    async fn test_succeeds_first_attempt() {
        let gateway = Arc::new(ScriptedGateway::new(vec![ok("{}")]));
        let result = invoker(gateway.clone())
            .invoke(&request(), &credential(), GradingRound::Independent, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.completion.content, "{}");
        assert_eq!(result.attempts, 1);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let gateway = Arc::new(ScriptedGateway::new(vec![unavailable(), unavailable(), ok("done")]));
        let result = invoker(gateway.clone())
            .invoke(&request(), &credential(), GradingRound::Independent, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.attempts, 3);
        assert_eq!(gateway.calls(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            unavailable(),
            unavailable(),
            unavailable(),
            ok("too late"),
        ]));
        let err = invoker(gateway.clone())
            .invoke(&request(), &credential(), GradingRound::Independent, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GradeError::Provider { attempts: 3, .. }));
        assert_eq!(gateway.calls(), 3);
    }

    #[tokio::test]
    async fn test_non_transient_not_retried() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(GatewayError::HttpStatus {
                status: 401,
                message: "bad key".into(),
            }),
            ok("unreachable"),
        ]));
        let err = invoker(gateway.clone())
            .invoke(&request(), &credential(), GradingRound::Independent, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GradeError::Provider { attempts: 1, .. }));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_from_gateway_not_retried() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(GatewayError::MissingCredential {
                provider: Provider::Anthropic,
                model: "claude-3-5-sonnet-20241022".into(),
            }),
            ok("unreachable"),
        ]));
        let credential = Credential::new(KeySource::UserKeys).with_key(Provider::OpenAi, "sk");
        let request = CompletionRequest::new(Model::Claude35Sonnet, "s", "u");

        let err = invoker(gateway.clone())
            .invoke(&request, &credential, GradingRound::Independent, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GradeError::Configuration(ref m) if m.contains("Anthropic")));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_provider_choice_left_to_gateway() {
        // Name suggests Anthropic, but the gateway serves it from a Google key
        let gateway = Arc::new(ScriptedGateway::new(vec![ok("{}")]));
        let credential = Credential::new(KeySource::UserKeys).with_key(Provider::Google, "g");
        let request = CompletionRequest::new(Model::from("claude-proxy"), "s", "u");

        let result = invoker(gateway.clone())
            .invoke(&request, &credential, GradingRound::Independent, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.attempts, 1);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_gateway_configuration_error_not_retried() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(GatewayError::ModelNotAvailable("mystery-model".into())),
            ok("unreachable"),
        ]));
        let request = CompletionRequest::new(Model::from("mystery-model"), "s", "u");

        let err = invoker(gateway.clone())
            .invoke(&request, &credential(), GradingRound::Deliberation, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GradeError::Configuration(_)));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_retried_then_reported() {
        let gateway =
            Arc::new(ScriptedGateway::new(vec![ok("slow"), ok("slow")]).with_delay(Duration::from_secs(60)));
        let params = ExecutionParams::default()
            .with_call_timeout(Some(Duration::from_secs(1)))
            .with_retry(RetryPolicy::default().with_max_attempts(2));

        let err = ModelInvoker::new(gateway.clone(), params)
            .invoke(&request(), &credential(), GradingRound::Independent, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err, GradeError::Timeout { attempts: 2 });
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let gateway = Arc::new(ScriptedGateway::new(vec![ok("unused")]));
        let token = CancellationToken::new();
        token.cancel();

        let err = invoker(gateway)
            .invoke(&request(), &credential(), GradingRound::Independent, &token)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
    }
}
