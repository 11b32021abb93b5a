//! Anthropic messages adapter

use super::ProviderAdapter;
use super::http::{endpoint, send_json, token_count, wire_temperature};
use crate::config::FileAnthropicConfig;
use async_trait::async_trait;
use council_application::ports::llm_gateway::{Completion, CompletionRequest, GatewayError};
use council_domain::Provider;
use serde_json::{Value, json};

pub struct AnthropicAdapter {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
}

impl AnthropicAdapter {
    pub fn new(http: reqwest::Client, config: &FileAnthropicConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_version: config.api_version.clone(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &str,
    ) -> Result<Completion, GatewayError> {
        let http_request = self
            .http
            .post(endpoint(&self.base_url, "v1/messages"))
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(&request_body(request));

        parse_response(&send_json(http_request).await?)
    }
}

/// The messages API has no JSON mode; the system prompt asks for JSON.
pub(crate) fn request_body(request: &CompletionRequest) -> Value {
    json!({
        "model": request.model.api_id(),
        "max_tokens": request.max_tokens,
        "temperature": wire_temperature(request.temperature),
        "system": request.system_prompt,
        "messages": [{ "role": "user", "content": request.user_prompt }],
    })
}

pub(crate) fn parse_response(value: &Value) -> Result<Completion, GatewayError> {
    let text: String = value
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|b| b.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GatewayError::InvalidResponse(
            "no text content blocks".to_string(),
        ));
    }

    Ok(Completion {
        content: text,
        prompt_tokens: token_count(value, "/usage/input_tokens"),
        completion_tokens: token_count(value, "/usage/output_tokens"),
    })
}
