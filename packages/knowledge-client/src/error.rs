//! Error types for the knowledge client.

use thiserror::Error;

/// Result type for knowledge client operations.
pub type Result<T> = std::result::Result<T, KnowledgeError>;

/// Knowledge client errors.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// Configuration error (missing or malformed endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, body read failed)
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered 2xx but with an error body (`{"detail": ...}`)
    #[error("Service reported an error: {0}")]
    Service(String),

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl KnowledgeError {
    /// Whether the remote service itself reported the failure, as opposed to
    /// the request never completing or the answer being unreadable.
    pub fn is_upstream_reported(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Service(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_reported_classification() {
        assert!(KnowledgeError::Api {
            status: 502,
            message: "bad gateway".into()
        }
        .is_upstream_reported());
        assert!(KnowledgeError::Service("index offline".into()).is_upstream_reported());
        assert!(!KnowledgeError::Network("refused".into()).is_upstream_reported());
        assert!(!KnowledgeError::Parse("eof".into()).is_upstream_reported());
    }
}
