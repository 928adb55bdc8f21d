use serde_json::{json, Value};
use tracing::info;

use crate::common::json::field;
use crate::common::ApiError;
use crate::kernel::ServerDeps;

/// Forward a knowledge-base question to the knowledge hub API.
pub async fn query_knowledge_hub(deps: &ServerDeps, body: &Value) -> Result<Value, ApiError> {
    let (Some(query), Some(knowledge_base_id)) =
        (field(body, "query"), field(body, "knowledge_base_id"))
    else {
        return Err(ApiError::Validation(
            "Missing required fields: query and knowledge_base_id".into(),
        ));
    };

    info!(%query, %knowledge_base_id, "Knowledge hub request");

    let response = deps
        .upstream
        .post_json(
            &deps.upstreams.knowledge_hub,
            &json!({ "query": query, "knowledge_base_id": knowledge_base_id }),
        )
        .await?;

    if !response.is_success() {
        return Err(ApiError::upstream(response.status));
    }

    tracing::debug!(payload = %response.body, "Knowledge hub response");
    Ok(response.body)
}
