//! Scripted provider for tests.

use super::{ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::Secret;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What the mock answers with on every call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Text(String),
    ApiError(StatusCode, String),
    Empty,
    InvalidResponse(String),
    NetworkError(String),
}

/// Mock text provider that replays one outcome and records the prompts it saw.
pub struct MockTextProvider {
    outcome: MockOutcome,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(MockOutcome::Text(text.into()))
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        _api_key: &Secret<String>,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match &self.outcome {
            MockOutcome::Text(text) => Ok(ProviderResponse {
                text: text.clone(),
                input_tokens: Some(prompt.len() as i32 / 4),
                output_tokens: Some(text.len() as i32 / 4),
            }),
            MockOutcome::ApiError(status, body) => Err(ProviderError::ApiError {
                status: *status,
                body: body.clone(),
            }),
            MockOutcome::Empty => Err(ProviderError::EmptyResponse),
            MockOutcome::InvalidResponse(msg) => Err(ProviderError::InvalidResponse(msg.clone())),
            MockOutcome::NetworkError(msg) => Err(ProviderError::NetworkError(msg.clone())),
        }
    }
}
