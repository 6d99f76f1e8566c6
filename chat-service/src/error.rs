use crate::services::providers::ProviderError;
use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Every way a relay request can end other than success.
///
/// The `Display` text is exactly what the caller sees, so upstream and
/// internal variants carry fixed messages only.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method {0} Not Allowed")]
    MethodNotAllowed(Method),

    #[error("The request body must contain a 'prompt' field.")]
    MissingPrompt,

    #[error("Server configuration error: API key is missing.")]
    MissingApiKey,

    /// Upstream rejected the call; its status is mirrored to the caller.
    #[error("Failed to fetch from Gemini API.")]
    Upstream(StatusCode),

    #[error("No valid content received from Gemini API.")]
    NoContent,

    #[error("An internal server error occurred.")]
    Internal(#[source] anyhow::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingPrompt => StatusCode::BAD_REQUEST,
            RelayError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Upstream(status) => *status,
            RelayError::NoContent => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed(_) => "method_not_allowed",
            RelayError::MissingPrompt => "missing_prompt",
            RelayError::MissingApiKey => "missing_api_key",
            RelayError::Upstream(_) => "upstream_error",
            RelayError::NoContent => "no_content",
            RelayError::Internal(_) => "internal_error",
        }
    }
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ApiError { status, .. } => RelayError::Upstream(status),
            ProviderError::EmptyResponse => RelayError::NoContent,
            other => RelayError::Internal(anyhow::Error::new(other)),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();

        if matches!(self, RelayError::MethodNotAllowed(_)) {
            return (status, [(header::ALLOW, "POST")], self.to_string()).into_response();
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_mirrors_status() {
        let err: RelayError = ProviderError::ApiError {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "quota exceeded".to_string(),
        }
        .into();

        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.to_string(), "Failed to fetch from Gemini API.");
    }

    #[test]
    fn test_empty_response_maps_to_no_content() {
        let err: RelayError = ProviderError::EmptyResponse.into();
        assert!(matches!(err, RelayError::NoContent));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_network_error_is_internal_and_opaque() {
        let err: RelayError = ProviderError::NetworkError("connection reset".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "An internal server error occurred.");
    }

    #[test]
    fn test_method_not_allowed_advertises_post() {
        let response = RelayError::MethodNotAllowed(Method::GET).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }
}
