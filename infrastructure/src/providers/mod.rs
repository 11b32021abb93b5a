//! Provider adapters
//!
//! Each adapter speaks one vendor's HTTP API. [`routing::RoutingGateway`]
//! picks the adapter for a model, looks up the key in the run's credential
//! and bounds how many calls are in flight.

pub mod anthropic;
pub mod gemini;
mod http;
pub mod openai;
pub mod routing;

use async_trait::async_trait;
use council_application::ports::llm_gateway::{Completion, CompletionRequest, GatewayError};
use council_domain::Provider;

/// One vendor API
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    /// Perform a single completion call with the given API key
    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &str,
    ) -> Result<Completion, GatewayError>;
}
