//! JSON proxy endpoints.
//!
//! Bodies are read raw and parsed by hand so malformed JSON gets the same
//! `{error}` shape as every other failure.

use axum::{body::Bytes, extract::Extension, Json};
use serde_json::Value;

use crate::common::json::parse_body;
use crate::common::ApiError;
use crate::domains::proxy::{analyze_transaction_chain, predict_insight, query_knowledge_hub};
use crate::server::app::AxumAppState;

pub async fn knowledge_hub_handler(
    Extension(state): Extension<AxumAppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;
    query_knowledge_hub(&state.deps, &body).await.map(Json)
}

pub async fn predict_insight_handler(
    Extension(state): Extension<AxumAppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;
    predict_insight(&state.deps, &body).await.map(Json)
}

pub async fn transaction_chain_handler(
    Extension(state): Extension<AxumAppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;
    analyze_transaction_chain(&state.deps, &body).await.map(Json)
}
