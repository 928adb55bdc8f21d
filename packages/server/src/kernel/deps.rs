//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container handed to every
//! route. All external services sit behind trait abstractions so the chat
//! pipeline and the proxies can be driven by test doubles.

use anyhow::{Context, Result};
use async_trait::async_trait;
use knowledge_client::{
    InferenceClient, InferenceRequest, KnowledgeClient, KnowledgeResponse, SummarizeResponse,
    TokenStream,
};
use reqwest::header;
use std::sync::Arc;

use crate::config::{Config, StreamSettings, UpstreamUrls};
use crate::kernel::{BaseInferenceStream, BaseKnowledgeService, BaseUpstreamApi, UpstreamResponse};

// =============================================================================
// KnowledgeClient Adapter (implements BaseKnowledgeService trait)
// =============================================================================

/// Wrapper around KnowledgeClient that implements BaseKnowledgeService trait
pub struct KnowledgeAdapter(pub KnowledgeClient);

impl KnowledgeAdapter {
    pub fn new(client: KnowledgeClient) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseKnowledgeService for KnowledgeAdapter {
    async fn knowledge(&self, query: &str) -> knowledge_client::Result<KnowledgeResponse> {
        self.0.knowledge(query).await
    }

    async fn summarize(
        &self,
        knowledge: &KnowledgeResponse,
        max_length: u32,
    ) -> knowledge_client::Result<SummarizeResponse> {
        self.0.summarize(knowledge, max_length).await
    }
}

// =============================================================================
// InferenceClient Adapter (implements BaseInferenceStream trait)
// =============================================================================

pub struct InferenceAdapter(pub InferenceClient);

impl InferenceAdapter {
    pub fn new(client: InferenceClient) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseInferenceStream for InferenceAdapter {
    async fn stream(&self, request: &InferenceRequest) -> knowledge_client::Result<TokenStream> {
        self.0.stream(request).await
    }
}

// =============================================================================
// HTTP upstream (implements BaseUpstreamApi trait)
// =============================================================================

/// reqwest-backed JSON poster for the proxy routes
#[derive(Clone, Default)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BaseUpstreamApi for HttpUpstream {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<UpstreamResponse> {
        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                url,
                status = status.as_u16(),
                reason = status.canonical_reason().unwrap_or(""),
                "External API error"
            );
            return Ok(UpstreamResponse::failed(status.as_u16()));
        }

        let body = response
            .json()
            .await
            .with_context(|| format!("Invalid JSON from {}", url))?;

        Ok(UpstreamResponse {
            status: status.as_u16(),
            body,
        })
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies shared by every request (immutable, cheap to clone)
#[derive(Clone)]
pub struct ServerDeps {
    pub knowledge: Arc<dyn BaseKnowledgeService>,
    pub upstream: Arc<dyn BaseUpstreamApi>,
    /// When set, answers are generated token by token instead of replaying the summary
    pub inference: Option<Arc<dyn BaseInferenceStream>>,
    pub upstreams: UpstreamUrls,
    pub stream: StreamSettings,
}

impl ServerDeps {
    pub fn new(
        knowledge: Arc<dyn BaseKnowledgeService>,
        upstream: Arc<dyn BaseUpstreamApi>,
        upstreams: UpstreamUrls,
        stream: StreamSettings,
    ) -> Self {
        Self {
            knowledge,
            upstream,
            inference: None,
            upstreams,
            stream,
        }
    }

    pub fn with_inference(mut self, inference: Arc<dyn BaseInferenceStream>) -> Self {
        self.inference = Some(inference);
        self
    }

    /// Construct the production services described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        // One connection pool for every outbound call
        let http = reqwest::Client::new();

        let knowledge = KnowledgeClient::with_client(http.clone(), &config.knowledge_endpoint)
            .context("Failed to create knowledge client")?;

        let mut deps = Self::new(
            Arc::new(KnowledgeAdapter::new(knowledge)),
            Arc::new(HttpUpstream::new(http.clone())),
            config.upstreams.clone(),
            config.stream,
        );

        if let Some(endpoint) = &config.inference_endpoint {
            let inference = InferenceClient::with_client(http, endpoint)
                .context("Failed to create inference client")?;
            deps = deps.with_inference(Arc::new(InferenceAdapter::new(inference)));
        }

        Ok(deps)
    }
}
