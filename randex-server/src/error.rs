//! API error handling module
//!
//! Maps core store errors and request validation failures onto HTTP status
//! codes and a JSON error body. The status mapping lives here, not in the
//! core: the store reports what went wrong, the API decides how to say it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use randex_core::RandexError;
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Store error - error from the sampling store
    #[error("Store error: {0}")]
    Store(#[from] RandexError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(e) if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            Self::Store(RandexError::Cancelled) => StatusCode::REQUEST_TIMEOUT,
            Self::Store(RandexError::Closed) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Store(e) if e.is_invalid_input() => "INVALID_INPUT",
            Self::Store(RandexError::Cancelled) => "CANCELLED",
            Self::Store(RandexError::Closed) => "STORE_CLOSED",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            // Validation failures are safe and useful to echo back.
            Self::BadRequest(message) => message.clone(),
            Self::Store(e) if e.is_invalid_input() => e.to_string(),
            Self::Store(RandexError::Cancelled) => "request cancelled".to_string(),
            // Internal details stay in the logs.
            Self::Store(_) | Self::Internal(_) => "failed to sample store".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                code = code,
                error = %internal_message,
                "Server error"
            );
        } else {
            tracing::warn!(
                status = %status,
                code = code,
                error = %internal_message,
                "Client error"
            );
        }

        let body = serde_json::json!({
            "error": client_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
