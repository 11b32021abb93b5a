//! Routing gateway
//!
//! Resolves the provider adapter for each model and bounds the number of
//! grading calls in flight across a run.

use super::ProviderAdapter;
use super::anthropic::AnthropicAdapter;
use super::gemini::GeminiAdapter;
use super::openai::OpenAiAdapter;
use crate::config::FileProvidersConfig;
use async_trait::async_trait;
use council_application::ports::llm_gateway::{
    Completion, CompletionRequest, GatewayError, LlmGateway,
};
use council_domain::{Credential, Model, Provider};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Default bound on concurrent outbound grading calls
pub const DEFAULT_MAX_CONCURRENT_CALLS: usize = 10;

/// [`LlmGateway`] that dispatches each call to the adapter serving the model.
///
/// Routing priority:
///  1. explicit `[providers.routing]` entry for the model identifier
///  2. provider family inferred from the identifier
///  3. otherwise `ModelNotAvailable`
pub struct RoutingGateway {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    explicit_model_routing: HashMap<String, Provider>,
    permits: Arc<Semaphore>,
}

impl RoutingGateway {
    pub fn new(
        providers: Vec<Arc<dyn ProviderAdapter>>,
        routing: &HashMap<String, String>,
        max_concurrent_calls: usize,
    ) -> Self {
        let mut explicit_model_routing = HashMap::new();
        for (model_name, provider_name) in routing {
            match provider_name.parse::<Provider>() {
                Ok(provider) => {
                    explicit_model_routing.insert(model_name.clone(), provider);
                }
                Err(e) => warn!(model = %model_name, "Ignoring routing entry: {}", e),
            }
        }

        Self {
            providers,
            explicit_model_routing,
            permits: Arc::new(Semaphore::new(max_concurrent_calls.max(1))),
        }
    }

    /// Build the gateway with the OpenAI, Anthropic and Gemini adapters
    pub fn from_config(config: &FileProvidersConfig) -> Self {
        let http = reqwest::Client::new();
        let providers: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(OpenAiAdapter::new(http.clone(), &config.openai)),
            Arc::new(AnthropicAdapter::new(http.clone(), &config.anthropic)),
            Arc::new(GeminiAdapter::new(http, &config.google)),
        ];
        Self::new(providers, &config.routing, config.max_concurrent_calls)
    }

    /// Provider that will serve `model`, honouring explicit routing first
    pub fn provider_for(&self, model: &Model) -> Option<Provider> {
        self.explicit_model_routing
            .get(model.as_str())
            .copied()
            .or_else(|| model.provider())
    }

    fn resolve_provider(&self, model: &Model) -> Result<&dyn ProviderAdapter, GatewayError> {
        let provider = self.provider_for(model).ok_or_else(|| {
            GatewayError::ModelNotAvailable(format!(
                "{model}: cannot infer provider, add a [providers.routing] entry"
            ))
        })?;

        self.providers
            .iter()
            .find(|p| p.provider() == provider)
            .map(|p| p.as_ref())
            .ok_or_else(|| {
                GatewayError::ModelNotAvailable(format!(
                    "{model}: no {} adapter registered",
                    provider.display_name()
                ))
            })
    }
}

#[async_trait]
impl LlmGateway for RoutingGateway {
    async fn complete(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> Result<Completion, GatewayError> {
        let adapter = self.resolve_provider(&request.model)?;
        let provider = adapter.provider();
        let api_key =
            credential
                .key_for(provider)
                .ok_or_else(|| GatewayError::MissingCredential {
                    provider,
                    model: request.model.to_string(),
                })?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| GatewayError::Other(e.to_string()))?;

        debug!(model = %request.model, provider = %provider, "Dispatching completion");
        adapter.complete(request, api_key).await
    }
}
