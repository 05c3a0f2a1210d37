//! Unified API error type
//!
//! Every service maps its failures into `ApiError`, which carries the HTTP
//! status and renders the flat `{"status": "<message>"}` wire body. No stack
//! traces or internal identifiers ever reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Unified error type for all service APIs
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range input (400). Never retried.
    #[error("{message}")]
    Invalid { message: String },

    /// Referenced entity does not exist (404)
    #[error("{resource} Not Found")]
    NotFound { resource: String },

    /// Resource already exists (409)
    #[error("{resource} already exists")]
    Conflict { resource: String },

    /// Credential verification failed (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Method not allowed (405)
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Store, cache or remote-service dependency failed (500, retryable)
    #[error("{message}")]
    Dependency { message: String },

    /// Internal failure, including mid-commit persistence faults (500)
    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid { message: message.into() }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn conflict(resource: impl Into<String>) -> Self {
        Self::Conflict { resource: resource.into() }
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency { message: message.into() }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Dependency { .. } | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing status message
    pub fn message(&self) -> String {
        match self {
            Self::Invalid { message } => message.clone(),
            Self::NotFound { resource } => format!("{resource} Not Found"),
            Self::Conflict { resource } => format!("{resource} already exists"),
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::MethodNotAllowed => "Method Not Allowed".to_string(),
            // Dependency details stay in the logs, not on the wire
            Self::Dependency { .. } | Self::Internal => "Internal Server Error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Dependency { message } = &self {
            tracing::error!(error = %message, "dependency failure");
        }
        let body = serde_json::json!({ "status": self.message() });
        (self.status_code(), axum::Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
