//! Pure REST client for the audit knowledge service.
//!
//! The service exposes two endpoints used to answer chat questions:
//! `POST /knowledge` retrieves the documents and guard flags relevant to a
//! query, and `POST /summarize` condenses a knowledge response into a short
//! answer. The client carries no chat logic of its own.
//!
//! [`InferenceClient`] talks to an optional streaming text-generation
//! endpoint whose output is decoded by [`TokenStream`].
//!
//! # Example
//!
//! ```rust,ignore
//! use knowledge_client::KnowledgeClient;
//!
//! let client = KnowledgeClient::new("https://knowledge.internal")?;
//!
//! let knowledge = client.knowledge("What is FIAR?").await?;
//! let summary = client.summarize(&knowledge, 200).await?;
//! ```

pub mod error;
pub mod inference;
pub mod streaming;
pub mod types;

pub use error::{KnowledgeError, Result};
pub use inference::InferenceClient;
pub use streaming::TokenStream;
pub use types::*;

use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Knowledge service client.
#[derive(Clone)]
pub struct KnowledgeClient {
    http_client: Client,
    base_url: Url,
}

impl KnowledgeClient {
    /// Create a client for the service rooted at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(http_client: Client, base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref()).map_err(|e| {
            KnowledgeError::Config(format!("Invalid knowledge endpoint {:?}: {}", base_url.as_ref(), e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(KnowledgeError::Config(format!(
                "Knowledge endpoint {} cannot be used as a base URL",
                base_url
            )));
        }
        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Create from environment variable `KNOWLEDGE_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("KNOWLEDGE_ENDPOINT")
            .map_err(|_| KnowledgeError::Config("KNOWLEDGE_ENDPOINT not set".into()))?;
        Self::new(endpoint)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Look up the documents and guard flags for a query.
    pub async fn knowledge(&self, query: &str) -> Result<KnowledgeResponse> {
        let request = KnowledgeRequest {
            query: query.to_string(),
        };
        self.post("/knowledge", &request).await
    }

    /// Summarize a knowledge response into at most `max_length` words.
    pub async fn summarize(
        &self,
        knowledge_response: &KnowledgeResponse,
        max_length: u32,
    ) -> Result<SummarizeResponse> {
        let request = SummarizeRequest {
            knowledge_response,
            max_length,
        };
        self.post("/summarize", &request).await
    }

    /// Resolve `path` against the base URL.
    ///
    /// Paths are absolute, so any path component of the base URL is replaced,
    /// matching how the dashboard's `new URL(path, base)` resolved them.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| KnowledgeError::Config(format!("Invalid endpoint path {}: {}", path, e)))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(url.clone())
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Knowledge service request failed");
                KnowledgeError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(url = %url, status = %status, error = %error_text, "Knowledge service API error");
            return Err(KnowledgeError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| KnowledgeError::Parse(e.to_string()))?;

        // FastAPI reports handler failures as `{"detail": ...}`.
        if let Some(detail) = value.get("detail") {
            warn!(url = %url, detail = %detail, "Knowledge service returned an error body");
            return Err(KnowledgeError::Service(detail.to_string()));
        }

        debug!(
            url = %url,
            duration_ms = start.elapsed().as_millis(),
            "Knowledge service call"
        );

        serde_json::from_value(value).map_err(|e| KnowledgeError::Parse(e.to_string()))
    }
}
