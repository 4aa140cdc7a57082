use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use recommender::RecommendError;

/// Errors surfaced to HTTP clients
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Movie '{0}' not found in database")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Detail is logged, never sent to the client
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::NotFound(title) => ApiError::NotFound(title),
            RecommendError::InvalidArgument(msg) => ApiError::InvalidInput(msg),
            RecommendError::Integrity(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "detail": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
