use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AxumAppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    knowledge_endpoint: String,
}

/// Health check endpoint
///
/// The server holds no connections of its own, so it is healthy whenever it
/// is serving. Reports the configured knowledge endpoint for debugging.
pub async fn health_handler(Extension(state): Extension<AxumAppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        knowledge_endpoint: state.knowledge_endpoint.clone(),
    })
}
