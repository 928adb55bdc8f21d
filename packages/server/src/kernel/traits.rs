// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Chat and proxy behaviour live in the domains and call through these traits.
//
// Naming convention: Base* for trait names (e.g., BaseKnowledgeService)

use anyhow::Result;
use async_trait::async_trait;
use knowledge_client::{InferenceRequest, KnowledgeResponse, SummarizeResponse, TokenStream};

// =============================================================================
// Knowledge Trait (knowledge lookup + summarization)
// =============================================================================

#[async_trait]
pub trait BaseKnowledgeService: Send + Sync {
    /// Retrieve documents and guard flags for a query
    async fn knowledge(&self, query: &str) -> knowledge_client::Result<KnowledgeResponse>;

    /// Condense a knowledge response into a short answer
    async fn summarize(
        &self,
        knowledge: &KnowledgeResponse,
        max_length: u32,
    ) -> knowledge_client::Result<SummarizeResponse>;
}

// =============================================================================
// Inference Trait (optional streamed generation)
// =============================================================================

#[async_trait]
pub trait BaseInferenceStream: Send + Sync {
    /// Start a streamed generation; tokens arrive through the returned stream
    async fn stream(&self, request: &InferenceRequest) -> knowledge_client::Result<TokenStream>;
}

// =============================================================================
// Upstream Trait (fixed external JSON APIs behind the proxy routes)
// =============================================================================

/// Status and body of an upstream call.
///
/// `body` is only parsed for 2xx answers; failed calls carry `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl UpstreamResponse {
    pub fn ok(body: serde_json::Value) -> Self {
        Self { status: 200, body }
    }

    pub fn failed(status: u16) -> Self {
        Self {
            status,
            body: serde_json::Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait BaseUpstreamApi: Send + Sync {
    /// POST a JSON body and return the status with the parsed JSON answer
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<UpstreamResponse>;
}
