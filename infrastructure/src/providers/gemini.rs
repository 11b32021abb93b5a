//! Google Gemini `generateContent` adapter

use super::ProviderAdapter;
use super::http::{endpoint, send_json, token_count, wire_temperature};
use crate::config::FileGoogleConfig;
use async_trait::async_trait;
use council_application::ports::llm_gateway::{Completion, CompletionRequest, GatewayError};
use council_domain::Provider;
use serde_json::{Value, json};

pub struct GeminiAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiAdapter {
    pub fn new(http: reqwest::Client, config: &FileGoogleConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &str,
    ) -> Result<Completion, GatewayError> {
        // The `gemini/` routing prefix is not part of the API model name
        let path = format!("v1beta/models/{}:generateContent", request.model.api_id());
        let http_request = self
            .http
            .post(endpoint(&self.base_url, &path))
            .header("x-goog-api-key", api_key)
            .json(&request_body(request));

        parse_response(&send_json(http_request).await?)
    }
}

pub(crate) fn request_body(request: &CompletionRequest) -> Value {
    let mut generation_config = json!({
        "temperature": wire_temperature(request.temperature),
        "maxOutputTokens": request.max_tokens,
    });
    if request.json_mode {
        generation_config["responseMimeType"] = json!("application/json");
    }

    json!({
        "systemInstruction": { "parts": [{ "text": request.system_prompt }] },
        "contents": [{ "role": "user", "parts": [{ "text": request.user_prompt }] }],
        "generationConfig": generation_config,
    })
}

pub(crate) fn parse_response(value: &Value) -> Result<Completion, GatewayError> {
    let text: String = value
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = value
            .pointer("/candidates/0/finishReason")
            .or_else(|| value.pointer("/promptFeedback/blockReason"))
            .and_then(Value::as_str)
            .unwrap_or("no candidates");
        return Err(GatewayError::InvalidResponse(format!(
            "empty Gemini response ({reason})"
        )));
    }

    Ok(Completion {
        content: text,
        prompt_tokens: token_count(value, "/usageMetadata/promptTokenCount"),
        completion_tokens: token_count(value, "/usageMetadata/candidatesTokenCount"),
    })
}
