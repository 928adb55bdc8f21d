//! Client for a streaming text-generation endpoint.
//!
//! The endpoint takes an [`InferenceRequest`] and answers with newline
//! separated payload parts, decoded by [`TokenStream`].

use reqwest::{header, Client, Url};
use tracing::{debug, warn};

use crate::error::{KnowledgeError, Result};
use crate::streaming::TokenStream;
use crate::types::InferenceRequest;

#[derive(Clone)]
pub struct InferenceClient {
    http_client: Client,
    endpoint: Url,
}

impl InferenceClient {
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self> {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(http_client: Client, endpoint: impl AsRef<str>) -> Result<Self> {
        let endpoint = Url::parse(endpoint.as_ref()).map_err(|e| {
            KnowledgeError::Config(format!(
                "Invalid inference endpoint {:?}: {}",
                endpoint.as_ref(),
                e
            ))
        })?;
        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Start a generation and return its tokens as they arrive.
    pub async fn stream(&self, request: &InferenceRequest) -> Result<TokenStream> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.endpoint, error = %e, "Inference request failed");
                KnowledgeError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(url = %self.endpoint, status = %status, error = %error_text, "Inference API error");
            return Err(KnowledgeError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        debug!(url = %self.endpoint, "Inference stream opened");
        Ok(TokenStream::new(response.bytes_stream()))
    }
}
