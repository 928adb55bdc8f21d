//! Test harness for driving the router in-process.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so no port is bound for
//! the app itself. Tests that need the real knowledge client start a small
//! axum stub on an ephemeral port instead.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use audit_core::config::StreamSettings;
use audit_core::kernel::{KnowledgeAdapter, MockUpstreamApi, ServerDeps, TestDependencies};
use audit_core::server::build_app;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    routing::post,
    Json, Router,
};
use knowledge_client::KnowledgeClient;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_KNOWLEDGE_ENDPOINT: &str = "http://knowledge.test";

/// Initialize tracing once; respects RUST_LOG.
///
/// Run tests with: RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn test_app(deps: ServerDeps) -> Router {
    init_tracing();
    build_app(deps, TEST_KNOWLEDGE_ENDPOINT.to_string())
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

pub fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub fn options(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read the whole body; for SSE responses this waits for the stream to end.
pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

pub fn header_value<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

// =============================================================================
// Knowledge service stub
// =============================================================================

/// Requests received by the stub, as `(path, body)`
pub type Recorded = Arc<Mutex<Vec<(String, Value)>>>;

/// Canned answer for one stub endpoint
pub type StubReply = (StatusCode, Value);

/// Knowledge service stand-in serving fixed `/knowledge` and `/summarize`
/// answers over real HTTP.
pub struct StubKnowledge {
    base_url: String,
    requests: Recorded,
}

impl StubKnowledge {
    pub async fn spawn(knowledge: StubReply, summarize: StubReply) -> Self {
        let requests: Recorded = Arc::default();

        let app = Router::new()
            .route("/knowledge", post(reply("/knowledge", knowledge, requests.clone())))
            .route("/summarize", post(reply("/summarize", summarize, requests.clone())));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    /// Deps with the real knowledge client pointed at this stub
    pub fn server_deps(&self, stream: StreamSettings) -> ServerDeps {
        let client = KnowledgeClient::new(&self.base_url).expect("stub url is valid");
        ServerDeps::new(
            Arc::new(KnowledgeAdapter::new(client)),
            Arc::new(MockUpstreamApi::new()),
            TestDependencies::upstream_urls(),
            stream,
        )
    }
}

fn reply(
    path: &'static str,
    (status, body): StubReply,
    requests: Recorded,
) -> impl Fn(Json<Value>) -> std::future::Ready<(StatusCode, Json<Value>)> + Clone + Send + Sync + 'static
{
    move |Json(request): Json<Value>| {
        requests.lock().unwrap().push((path.to_string(), request));
        std::future::ready((status, Json(body.clone())))
    }
}
