//! HTTP-facing error type for the JSON routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request input (400)
    #[error("{0}")]
    Validation(String),

    /// The external API answered with a non-2xx status; relayed as-is
    #[error("External API request failed with status {0}")]
    Upstream(StatusCode),

    /// Anything thrown along the way (500)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn upstream(status: u16) -> Self {
        Self::Upstream(StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::Upstream(status) => (
                status,
                Json(json!({
                    "error": "External API request failed",
                    "status": status.as_u16(),
                })),
            )
                .into_response(),
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation("Missing required field: message".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::upstream(404).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::upstream(42).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(anyhow::anyhow!("socket hang up"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
