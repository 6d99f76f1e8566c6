//! Generation-service abstractions and implementations.
//!
//! The handler talks to a [`TextProvider`]; the Gemini client is the real
//! backend and the mock stands in for it in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::Secret;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Upstream answered with a non-2xx status. `body` is for logs only.
    #[error("API error {status}: {body}")]
    ApiError { status: StatusCode, body: String },

    /// Upstream answered 2xx but carried no candidate text.
    #[error("No candidate text in response")]
    EmptyResponse,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    /// Text of the first candidate.
    pub text: String,

    /// Input tokens consumed, when reported.
    pub input_tokens: Option<i32>,

    /// Output tokens generated, when reported.
    pub output_tokens: Option<i32>,
}

/// Trait for text generation backends (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Submit one prompt and wait for the complete result.
    async fn generate(
        &self,
        prompt: &str,
        api_key: &Secret<String>,
    ) -> Result<ProviderResponse, ProviderError>;
}
