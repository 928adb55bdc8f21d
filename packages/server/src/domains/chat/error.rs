use knowledge_client::KnowledgeError;
use thiserror::Error;

use super::transport::SinkError;

/// Shown when the knowledge service itself reported the failure.
pub const UPSTREAM_ERROR_MESSAGE: &str =
    "The backend API returned an error. Please try again later.";

/// Shown for every other failure.
pub const GENERIC_ERROR_MESSAGE: &str =
    "An error occurred while processing your request. Please check the server logs for more details.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ChatError {
    /// User-facing text for the `ERROR` event.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::Knowledge(e) if e.is_upstream_reported() => UPSTREAM_ERROR_MESSAGE,
            _ => GENERIC_ERROR_MESSAGE,
        }
    }
}
