//! HTTP error type for ahan-hub

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::admin::AdminError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Login rejected (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Editor action not available in its current state (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// ahan-common error; status follows the error kind
    #[error(transparent)]
    Common(#[from] ahan_common::Error),
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        let message = err.to_string();
        match err {
            AdminError::InvalidTransition { .. } => ApiError::Conflict(message),
            AdminError::Catalog(inner) => ApiError::Common(inner),
        }
    }
}

fn common_status(err: &ahan_common::Error) -> StatusCode {
    use ahan_common::Error;

    match err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::AlreadyExists(_) => StatusCode::CONFLICT,
        Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Config(_) | Error::Io(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "INVALID_TRANSITION", msg),
            ApiError::Common(ref err) => (common_status(err), err.code(), err.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
