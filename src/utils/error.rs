use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::StoreError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error taxonomy. Every failure a guard or handler can produce maps to
/// exactly one variant, and every variant maps to exactly one status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session, invalid/expired session, or the session's user is gone.
    #[error("{0}")]
    Unauthenticated(String),
    /// Required input absent or malformed.
    #[error("{0}")]
    BadRequest(String),
    /// Authenticated identity lacks membership in the resolved workspace.
    #[error("{0}")]
    Forbidden(String),
    /// Registration with an email that already exists.
    #[error("{0}")]
    Conflict(String),
    /// Resource id not found within the authorized workspace scope.
    #[error("{0}")]
    NotFound(String),
    /// Unexpected store or infrastructure failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Generic 401 for missing or invalid sessions.
    pub fn unauthorized() -> Self {
        Self::Unauthenticated("Unauthorized".to_string())
    }

    /// Login failure. Identical for unknown email and wrong password so the
    /// response never reveals which check failed.
    pub fn invalid_credentials() -> Self {
        Self::Unauthenticated("Invalid email or password".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            // The dashboard client expects 400 for duplicate-email registrations.
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Unavailable(err) => ApiError::Internal(err),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(format!("Invalid request: {err}"))
    }
}
