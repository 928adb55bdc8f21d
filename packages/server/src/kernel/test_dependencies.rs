// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use knowledge_client::{
    InferenceRequest, KnowledgeError, KnowledgeResponse, SummarizeResponse, TokenStream,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use super::{BaseInferenceStream, BaseKnowledgeService, BaseUpstreamApi, ServerDeps, UpstreamResponse};
use crate::config::{StreamSettings, UpstreamUrls};
use crate::domains::chat::events::StreamEvent;
use crate::domains::chat::transport::{ResponseSink, SinkError};

// =============================================================================
// Mock Knowledge Service
// =============================================================================

/// Arguments captured from a summarize call
#[derive(Debug, Clone)]
pub struct SummarizeCallArgs {
    pub knowledge: KnowledgeResponse,
    pub max_length: u32,
}

/// Queued-response knowledge service.
///
/// Each call pops the next queued answer; an empty queue yields a network
/// error so a missing setup step fails loudly.
#[derive(Clone, Default)]
pub struct MockKnowledgeService {
    knowledge_responses: Arc<Mutex<VecDeque<knowledge_client::Result<KnowledgeResponse>>>>,
    summarize_responses: Arc<Mutex<VecDeque<knowledge_client::Result<SummarizeResponse>>>>,
    knowledge_calls: Arc<Mutex<Vec<String>>>,
    summarize_calls: Arc<Mutex<Vec<SummarizeCallArgs>>>,
}

impl MockKnowledgeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_knowledge(self, response: KnowledgeResponse) -> Self {
        self.knowledge_responses
            .lock()
            .unwrap()
            .push_back(Ok(response));
        self
    }

    pub fn with_knowledge_error(self, error: KnowledgeError) -> Self {
        self.knowledge_responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_summary(self, summary: &str) -> Self {
        self.summarize_responses
            .lock()
            .unwrap()
            .push_back(Ok(SummarizeResponse {
                summary: Some(summary.to_string()),
            }));
        self
    }

    pub fn with_summarize_error(self, error: KnowledgeError) -> Self {
        self.summarize_responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queries passed to `knowledge`, in call order
    pub fn knowledge_calls(&self) -> Vec<String> {
        self.knowledge_calls.lock().unwrap().clone()
    }

    pub fn summarize_calls(&self) -> Vec<SummarizeCallArgs> {
        self.summarize_calls.lock().unwrap().clone()
    }

    /// Total outbound calls of either kind
    pub fn call_count(&self) -> usize {
        self.knowledge_calls.lock().unwrap().len() + self.summarize_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseKnowledgeService for MockKnowledgeService {
    async fn knowledge(&self, query: &str) -> knowledge_client::Result<KnowledgeResponse> {
        self.knowledge_calls.lock().unwrap().push(query.to_string());
        self.knowledge_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(KnowledgeError::Network(
                    "MockKnowledgeService: no knowledge response queued".into(),
                ))
            })
    }

    async fn summarize(
        &self,
        knowledge: &KnowledgeResponse,
        max_length: u32,
    ) -> knowledge_client::Result<SummarizeResponse> {
        self.summarize_calls.lock().unwrap().push(SummarizeCallArgs {
            knowledge: knowledge.clone(),
            max_length,
        });
        self.summarize_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(KnowledgeError::Network(
                    "MockKnowledgeService: no summary queued".into(),
                ))
            })
    }
}

// =============================================================================
// Mock Inference Stream
// =============================================================================

/// Streams queued payload parts through the real token decoder.
#[derive(Clone, Default)]
pub struct MockInferenceStream {
    responses: Arc<Mutex<VecDeque<knowledge_client::Result<Vec<String>>>>>,
    calls: Arc<Mutex<Vec<InferenceRequest>>>,
}

impl MockInferenceStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a generation made of raw payload parts, e.g.
    /// `data:{"token": {"text": "Hi"}}\n`
    pub fn with_parts(self, parts: &[&str]) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(parts.iter().map(|p| p.to_string()).collect()));
        self
    }

    /// Queue a generation made of whole tokens
    pub fn with_tokens(self, tokens: &[&str]) -> Self {
        let parts: Vec<String> = tokens
            .iter()
            .map(|t| format!("{}\n", serde_json::json!({ "token": { "text": t } })))
            .collect();
        self.responses.lock().unwrap().push_back(Ok(parts));
        self
    }

    pub fn with_error(self, error: KnowledgeError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<InferenceRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseInferenceStream for MockInferenceStream {
    async fn stream(&self, request: &InferenceRequest) -> knowledge_client::Result<TokenStream> {
        self.calls.lock().unwrap().push(request.clone());
        let parts = self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(KnowledgeError::Network(
                "MockInferenceStream: no generation queued".into(),
            ))
        })?;

        let chunks: Vec<std::result::Result<Bytes, std::io::Error>> =
            parts.into_iter().map(|p| Ok(Bytes::from(p))).collect();
        Ok(TokenStream::new(futures::stream::iter(chunks)))
    }
}

// =============================================================================
// Memory sink
// =============================================================================

/// Records every event with the instant it was written.
///
/// Clones share the same recording, so a test can keep one handle while the
/// pipeline owns another.
#[derive(Clone, Default)]
pub struct MemorySink {
    frames: Arc<Mutex<Vec<(Instant, StreamEvent)>>>,
    closed: Arc<AtomicBool>,
    accept_limit: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `limit` events, then behave like a disconnected client.
    pub fn disconnect_after(limit: usize) -> Self {
        Self {
            accept_limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<StreamEvent> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Write instants, one per event
    pub fn timestamps(&self) -> Vec<Instant> {
        self.frames.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResponseSink for MemorySink {
    type Frame = StreamEvent;

    fn encode(event: &StreamEvent) -> std::result::Result<StreamEvent, SinkError> {
        Ok(event.clone())
    }

    async fn write(&mut self, frame: StreamEvent) -> std::result::Result<(), SinkError> {
        if self.is_closed() {
            return Err(SinkError::Closed);
        }
        let mut frames = self.frames.lock().unwrap();
        if self.accept_limit.is_some_and(|limit| frames.len() >= limit) {
            return Err(SinkError::Closed);
        }
        frames.push((Instant::now(), frame));
        Ok(())
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// =============================================================================
// Mock Upstream API
// =============================================================================

/// Arguments captured from a post_json call
#[derive(Debug, Clone)]
pub struct UpstreamCallArgs {
    pub url: String,
    pub body: serde_json::Value,
}

#[derive(Clone, Default)]
pub struct MockUpstreamApi {
    responses: Arc<Mutex<VecDeque<std::result::Result<UpstreamResponse, String>>>>,
    calls: Arc<Mutex<Vec<UpstreamCallArgs>>>,
}

impl MockUpstreamApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: UpstreamResponse) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a transport-level failure
    pub fn with_error(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<UpstreamCallArgs> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseUpstreamApi for MockUpstreamApi {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<UpstreamResponse> {
        self.calls.lock().unwrap().push(UpstreamCallArgs {
            url: url.to_string(),
            body: body.clone(),
        });
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("MockUpstreamApi: no response queued")),
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of mocks plus the ServerDeps wired to them
pub struct TestDependencies {
    pub knowledge: MockKnowledgeService,
    pub upstream: MockUpstreamApi,
    /// Wired into ServerDeps only when set
    pub inference: Option<MockInferenceStream>,
    pub stream: StreamSettings,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            knowledge: MockKnowledgeService::new(),
            upstream: MockUpstreamApi::new(),
            inference: None,
            stream: StreamSettings::default(),
        }
    }

    pub fn with_knowledge(mut self, knowledge: MockKnowledgeService) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn with_upstream(mut self, upstream: MockUpstreamApi) -> Self {
        self.upstream = upstream;
        self
    }

    pub fn with_inference(mut self, inference: MockInferenceStream) -> Self {
        self.inference = Some(inference);
        self
    }

    pub fn with_stream_settings(mut self, stream: StreamSettings) -> Self {
        self.stream = stream;
        self
    }

    /// Upstream URLs used by test deps; distinct hosts make calls easy to tell apart
    pub fn upstream_urls() -> UpstreamUrls {
        UpstreamUrls {
            knowledge_hub: "http://knowledge-hub.test/dla_audit".to_string(),
            predict_insight: "http://predict-insight.test/conversation/prompt".to_string(),
            transaction_chain: "http://transaction-chain.test/analyze".to_string(),
        }
    }

    pub fn server_deps(&self) -> ServerDeps {
        let deps = ServerDeps::new(
            Arc::new(self.knowledge.clone()),
            Arc::new(self.upstream.clone()),
            Self::upstream_urls(),
            self.stream,
        );
        match &self.inference {
            Some(inference) => deps.with_inference(Arc::new(inference.clone())),
            None => deps,
        }
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
