//! `/api/chat`: validate, forward to the generation service, map the outcome.

use crate::error::RelayError;
use crate::services::metrics::{record_outcome, record_upstream_latency};
use crate::services::providers::ProviderError;
use crate::startup::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Largest request body read when looking for the prompt.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Successful relay body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    method: Method,
    body: Body,
) -> Response {
    match relay(&state, &method, body).await {
        Ok(response) => {
            record_outcome("success");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            record_outcome(err.outcome());
            err.into_response()
        }
    }
}

/// Run one relay request to completion. Every path yields exactly one
/// response and at most one upstream call.
///
/// The body is only read once method and credential have passed, so neither
/// check depends on its size.
pub async fn relay(
    state: &AppState,
    method: &Method,
    body: Body,
) -> Result<ChatResponse, RelayError> {
    if *method != Method::POST {
        return Err(RelayError::MethodNotAllowed(method.clone()));
    }

    // Checked before the body so a misconfigured server reports itself
    // even to malformed requests.
    let api_key = state.credentials.api_key().ok_or_else(|| {
        tracing::error!("Upstream API key is not configured");
        RelayError::MissingApiKey
    })?;

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        tracing::warn!(error = %e, limit = MAX_BODY_BYTES, "Failed to read request body");
        RelayError::MissingPrompt
    })?;

    let prompt = extract_prompt(&body).ok_or(RelayError::MissingPrompt)?;

    let start = Instant::now();
    let result = state.text_provider.generate(&prompt, &api_key).await;
    record_upstream_latency(start.elapsed().as_secs_f64());

    match result {
        Ok(response) => {
            tracing::info!(
                prompt_len = prompt.len(),
                input_tokens = ?response.input_tokens,
                output_tokens = ?response.output_tokens,
                "Relayed prompt"
            );
            Ok(ChatResponse {
                text: response.text,
            })
        }
        Err(err) => {
            match &err {
                ProviderError::ApiError { status, body } => {
                    tracing::error!(status = %status, body = %body, "Gemini API error");
                }
                ProviderError::EmptyResponse => {
                    tracing::error!("Unexpected response structure from Gemini API");
                }
                other => {
                    tracing::error!(error = %other, "Internal server error");
                }
            }
            Err(err.into())
        }
    }
}

/// Pull a non-empty string `prompt` out of a JSON object body.
fn extract_prompt(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("prompt")
        .and_then(serde_json::Value::as_str)
        .filter(|prompt| !prompt.is_empty())
        .map(str::to_string)
}
