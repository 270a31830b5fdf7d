use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Error bodies keep the shapes existing chat clients already parse:
/// chat errors carry `error`, data lookups carry `message`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadChatRequest(String),
    #[error("{0}")]
    BadQuery(String),
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("{0}")]
    NotFound(String),
    #[error("Cannot {method} {path}")]
    NoRoute { method: String, path: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_query(message: impl Into<String>) -> Self {
        Self::BadQuery(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadChatRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": message })))
                    .into_response()
            }
            err @ ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response(),
            ApiError::BadQuery(message) => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "message": message })))
                    .into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(serde_json::json!({ "message": message })))
                    .into_response()
            }
            err @ ApiError::NoRoute { .. } => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "status": "error", "message": err.to_string() })),
            )
                .into_response(),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": "An error occurred while processing your message"
                    })),
                )
                    .into_response()
            }
        }
    }
}
