//! Shared HTTP plumbing for provider adapters

use council_application::ports::llm_gateway::GatewayError;
use council_domain::core::string::truncate;
use serde_json::Value;
use tracing::debug;

/// Longest provider error message kept in a [`GatewayError`]
const MAX_ERROR_MESSAGE_CHARS: usize = 300;

/// Send a JSON request and decode a JSON reply, classifying failures
pub(crate) async fn send_json(request: reqwest::RequestBuilder) -> Result<Value, GatewayError> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Provider returned error status");
        return Err(GatewayError::HttpStatus {
            status: status.as_u16(),
            message: error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string()),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

pub(crate) fn transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_decode() {
        GatewayError::InvalidResponse(error.to_string())
    } else {
        GatewayError::ConnectionError(error.to_string())
    }
}

/// Pull a human-readable message out of a provider error body.
///
/// All three vendors nest it as `{"error": {"message": ...}}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string());
    Some(truncate(&message, MAX_ERROR_MESSAGE_CHARS))
}

/// Temperature as sent on the wire, without f32 widening noise
pub(crate) fn wire_temperature(temperature: f32) -> f64 {
    (f64::from(temperature) * 1000.0).round() / 1000.0
}

/// Read a token counter, treating absence as zero
pub(crate) fn token_count(value: &Value, pointer: &str) -> u32 {
    value
        .pointer(pointer)
        .and_then(Value::as_u64)
        .map_or(0, |n| n.min(u64::from(u32::MAX)) as u32)
}

/// Join a base URL and a path without doubling slashes
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
