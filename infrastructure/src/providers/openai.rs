//! OpenAI chat completions adapter

use super::ProviderAdapter;
use super::http::{endpoint, send_json, token_count, wire_temperature};
use crate::config::FileOpenAiConfig;
use async_trait::async_trait;
use council_application::ports::llm_gateway::{Completion, CompletionRequest, GatewayError};
use council_domain::Provider;
use serde_json::{Value, json};

pub struct OpenAiAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl OpenAiAdapter {
    pub fn new(http: reqwest::Client, config: &FileOpenAiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &str,
    ) -> Result<Completion, GatewayError> {
        let http_request = self
            .http
            .post(endpoint(&self.base_url, "v1/chat/completions"))
            .bearer_auth(api_key)
            .json(&request_body(request));

        parse_response(&send_json(http_request).await?)
    }
}

pub(crate) fn request_body(request: &CompletionRequest) -> Value {
    let mut body = json!({
        "model": request.model.api_id(),
        "messages": [
            { "role": "system", "content": request.system_prompt },
            { "role": "user", "content": request.user_prompt },
        ],
        "temperature": wire_temperature(request.temperature),
        "max_tokens": request.max_tokens,
    });
    if request.json_mode {
        body["response_format"] = json!({ "type": "json_object" });
    }
    body
}

pub(crate) fn parse_response(value: &Value) -> Result<Completion, GatewayError> {
    let content = value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| GatewayError::InvalidResponse("no message content in choices".to_string()))?;

    Ok(Completion {
        content: content.to_string(),
        prompt_tokens: token_count(value, "/usage/prompt_tokens"),
        completion_tokens: token_count(value, "/usage/completion_tokens"),
    })
}
