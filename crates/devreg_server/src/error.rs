//! Error types for the HTTP server.

use crate::api::ErrorBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use devreg_core::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Message returned for every credential failure, whether or not the
/// account exists.
pub(crate) const UNAUTHORIZED_MESSAGE: &str = "invalid account or account key";

/// Errors that can occur in the server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Missing or malformed request input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown account or wrong account key.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credentials but the subscription is not active.
    #[error("payment required: {0}")]
    PaymentRequired(String),

    /// The request body exceeds the configured size limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid server configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// In-flight requests did not finish within the shutdown timeout.
    #[error("shutdown timed out after {0:?}")]
    ShutdownTimeout(Duration),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::InvalidConfig(_)
            | ServerError::ShutdownTimeout(_)
            | ServerError::Internal(_)
            | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message exposed to the client.
    fn public_message(&self) -> String {
        match self {
            ServerError::InvalidRequest(msg)
            | ServerError::PaymentRequired(msg)
            | ServerError::PayloadTooLarge(msg)
            | ServerError::NotFound(msg) => msg.clone(),
            ServerError::Unauthorized(_) => UNAUTHORIZED_MESSAGE.to_string(),
            _ => "internal server error".to_string(),
        }
    }
}

impl From<StoreError> for ServerError {
    /// Maps store failures from lookups performed after authorization.
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            ServerError::NotFound(err.to_string())
        } else if err.is_inactive() {
            ServerError::PaymentRequired(err.to_string())
        } else {
            ServerError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
