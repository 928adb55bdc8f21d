use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /knowledge`.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeRequest {
    pub query: String,
}

/// A document the knowledge service drew on.
///
/// Extra fields (scores, excerpts, ...) are kept so the response can be
/// forwarded to `/summarize` unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_uri: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KnowledgeSource {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            document_title: Some(title.into()),
            document_uri: Some(uri.into()),
            extra: Map::new(),
        }
    }
}

/// Response of `POST /knowledge`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<KnowledgeSource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_guards: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KnowledgeResponse {
    pub fn sources(&self) -> &[KnowledgeSource] {
        self.sources.as_deref().unwrap_or_default()
    }

    pub fn triggered_guards(&self) -> &[String] {
        self.triggered_guards.as_deref().unwrap_or_default()
    }
}

/// Body of `POST /summarize`.
#[derive(Debug, Clone, Serialize)]
pub struct SummarizeRequest<'a> {
    pub knowledge_response: &'a KnowledgeResponse,
    pub max_length: u32,
}

/// Response of `POST /summarize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummarizeResponse {
    #[serde(default)]
    pub summary: Option<String>,
}

/// Generation settings for a streamed inference call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceParameters {
    pub max_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for InferenceParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 512,
            temperature: None,
        }
    }
}

/// Body of a streaming text-generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceRequest {
    pub inputs: String,
    pub parameters: InferenceParameters,
    pub stream: bool,
}

impl InferenceRequest {
    pub fn streaming(inputs: impl Into<String>) -> Self {
        Self {
            inputs: inputs.into(),
            parameters: InferenceParameters::default(),
            stream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_forwarding() {
        let raw = json!({
            "sources": [{"document_title": "GAO Green Book", "document_uri": "s3://kb/green.pdf", "score": 0.91}],
            "triggered_guards": [],
            "answer_id": "kr-77"
        });

        let parsed: KnowledgeResponse = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(parsed.sources().len(), 1);
        assert_eq!(parsed.extra["answer_id"], "kr-77");

        let forwarded = serde_json::to_value(&parsed).unwrap();
        assert_eq!(forwarded, raw);
    }

    #[test]
    fn missing_lists_read_as_empty() {
        let parsed: KnowledgeResponse = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.sources().is_empty());
        assert!(parsed.triggered_guards().is_empty());
        assert!(parsed.sources.is_none());
    }

    #[test]
    fn summarize_body_shape() {
        let knowledge = KnowledgeResponse {
            triggered_guards: Some(vec![]),
            ..Default::default()
        };
        let body = serde_json::to_value(SummarizeRequest {
            knowledge_response: &knowledge,
            max_length: 200,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({"knowledge_response": {"triggered_guards": []}, "max_length": 200})
        );
    }

    #[test]
    fn inference_body_shape() {
        let body = serde_json::to_value(InferenceRequest::streaming("Context: FIAR")).unwrap();

        assert_eq!(
            body,
            json!({"inputs": "Context: FIAR", "parameters": {"max_new_tokens": 512}, "stream": true})
        );
    }
}
