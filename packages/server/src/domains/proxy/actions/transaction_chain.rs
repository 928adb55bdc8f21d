use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::common::json::field;
use crate::common::ApiError;
use crate::domains::proxy::canned::canned_analysis;
use crate::kernel::ServerDeps;

/// Run a transaction-chain analysis.
///
/// Known demo prompts are answered from the canned table without calling out.
pub async fn analyze_transaction_chain(deps: &ServerDeps, body: &Value) -> Result<Value, ApiError> {
    let (Some(prompt), Some(record_id)) = (field(body, "prompt"), field(body, "recordId")) else {
        return Err(ApiError::Validation(
            "Missing required fields: prompt and recordId".into(),
        ));
    };

    if let Some(analysis) = prompt.as_str().and_then(canned_analysis) {
        info!(%prompt, "Returning canned transaction chain analysis");
        return Ok(analysis);
    }

    let guid = format!("web-analysis-{}", Utc::now().timestamp_millis());
    let request = json!({
        "prompt": prompt,
        "guid": guid,
        "recordId": record_id,
        "outputBucket": "",
        "outputKey": "",
    });
    info!(%guid, %record_id, "Transaction chain request");

    let response = deps
        .upstream
        .post_json(&deps.upstreams.transaction_chain, &request)
        .await?;

    if !response.is_success() {
        return Err(ApiError::upstream(response.status));
    }

    tracing::debug!(payload = %response.body, "Transaction chain response");
    Ok(response.body)
}
