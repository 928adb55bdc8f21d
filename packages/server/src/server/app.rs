//! Application setup and server configuration.

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::proxy_cors;
use crate::server::routes::{
    chat_handler, health_handler, knowledge_hub_handler, predict_insight_handler,
    transaction_chain_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: ServerDeps,
    pub knowledge_endpoint: String,
}

/// Build the Axum application router
///
/// The proxy routes sit behind a permissive CORS layer that also answers
/// their OPTIONS preflights; the chat stream and health check are same-origin.
pub fn build_app(deps: ServerDeps, knowledge_endpoint: String) -> Router {
    let app_state = AxumAppState {
        deps,
        knowledge_endpoint,
    };

    let proxy_routes = Router::new()
        .route("/api/knowledge-hub", post(knowledge_hub_handler))
        .route("/api/predict-insight", post(predict_insight_handler))
        .route("/api/transaction-chain", post(transaction_chain_handler))
        .layer(proxy_cors());

    Router::new()
        .route("/api/chat", get(chat_handler))
        .route("/health", get(health_handler))
        .merge(proxy_routes)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
}
