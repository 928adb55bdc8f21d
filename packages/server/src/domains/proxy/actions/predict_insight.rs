use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::info;

use crate::common::json::{field, is_present};
use crate::common::ApiError;
use crate::kernel::ServerDeps;

/// Send a prompt to the predict-insight conversation API and normalize the
/// answer to `{result: {response}, sources, conversation_id, timestamp}`.
pub async fn predict_insight(deps: &ServerDeps, body: &Value) -> Result<Value, ApiError> {
    let message = field(body, "message")
        .ok_or_else(|| ApiError::Validation("Missing required field: message".into()))?;

    let now = Utc::now();
    let conversation_id = format!("conversation-{}", now.timestamp_millis());
    info!(%conversation_id, "Predict insight request");

    let response = deps
        .upstream
        .post_json(
            &deps.upstreams.predict_insight,
            &json!({ "text": message, "conversation_id": conversation_id }),
        )
        .await?;

    if !response.is_success() {
        return Err(ApiError::upstream(response.status));
    }

    Ok(format_insight(&response.body, &conversation_id, now))
}

/// Normalize the upstream answer; the response text is the first present of
/// `result.response`, `response`, `text`, else the raw JSON.
pub fn format_insight(upstream: &Value, conversation_id: &str, at: DateTime<Utc>) -> Value {
    let response = [
        upstream.pointer("/result/response"),
        upstream.get("response"),
        upstream.get("text"),
    ]
    .into_iter()
    .flatten()
    .find(|v| is_present(v))
    .cloned()
    .unwrap_or_else(|| Value::String(upstream.to_string()));

    json!({
        "result": { "response": response },
        "sources": field(upstream, "sources").cloned().unwrap_or_else(|| json!({})),
        "conversation_id": conversation_id,
        "timestamp": at.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{MockUpstreamApi, TestDependencies, UpstreamResponse};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn nested_response_wins() {
        let formatted = format_insight(
            &json!({"result": {"response": "nested"}, "response": "flat", "sources": {"Memo": "u1"}}),
            "conversation-1",
            at(),
        );

        assert_eq!(
            formatted,
            json!({
                "result": {"response": "nested"},
                "sources": {"Memo": "u1"},
                "conversation_id": "conversation-1",
                "timestamp": "2025-03-14T09:30:00.000Z"
            })
        );
    }

    #[test]
    fn falls_back_through_flat_fields() {
        let formatted = format_insight(&json!({"response": "", "text": "from text"}), "c", at());
        assert_eq!(formatted["result"]["response"], "from text");
        assert_eq!(formatted["sources"], json!({}));
    }

    #[test]
    fn falls_back_to_raw_json() {
        let formatted = format_insight(&json!({"score": 0.7}), "c", at());
        assert_eq!(formatted["result"]["response"], r#"{"score":0.7}"#);
    }

    #[test]
    fn raw_json_fallback_keeps_upstream_key_order() {
        let upstream: Value =
            serde_json::from_str(r#"{"zeta":1,"alpha":{"y":true,"b":null},"mid":"x"}"#).unwrap();

        let formatted = format_insight(&upstream, "c", at());
        assert_eq!(
            formatted["result"]["response"],
            r#"{"zeta":1,"alpha":{"y":true,"b":null},"mid":"x"}"#
        );
    }

    #[tokio::test]
    async fn forwards_message_as_text() {
        let deps = TestDependencies::new().with_upstream(
            MockUpstreamApi::new().with_response(UpstreamResponse::ok(json!({"response": "Likely NFR"}))),
        );

        let result = predict_insight(&deps.server_deps(), &json!({"message": "Predict CAP risk"}))
            .await
            .unwrap();

        let calls = deps.upstream.calls();
        assert_eq!(calls[0].url, TestDependencies::upstream_urls().predict_insight);
        assert_eq!(calls[0].body["text"], "Predict CAP risk");
        let conversation_id = calls[0].body["conversation_id"].as_str().unwrap();
        assert!(conversation_id.starts_with("conversation-"));

        assert_eq!(result["result"]["response"], "Likely NFR");
        assert_eq!(result["conversation_id"], conversation_id);
    }

    #[tokio::test]
    async fn missing_message_is_rejected() {
        let deps = TestDependencies::new();
        let err = predict_insight(&deps.server_deps(), &json!({"message": ""}))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation(m) if m == "Missing required field: message"));
        assert!(deps.upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_internal() {
        let deps = TestDependencies::new()
            .with_upstream(MockUpstreamApi::new().with_error("connection reset"));

        let err = predict_insight(&deps.server_deps(), &json!({"message": "hi"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Internal(_)));
    }
}
