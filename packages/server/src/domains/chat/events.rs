//! Chat stream events.
//!
//! Every event crosses the wire as the data of one SSE frame, where the JSON is
//! `{"type": <TAG>, "payload": {...}}`. `END_STREAM` carries no payload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamEvent {
    /// One piece of the answer text
    StreamResponse { message: String },

    /// Document title -> URI for the documents behind the answer
    AddSources { sources: IndexMap<String, String> },

    /// Link to a generated report
    AddSignedUrl { signed_url: String },

    /// The knowledge service flagged the query; the answer is withheld
    TriggeredGuard { message: String, guard: Vec<String> },

    /// Request failed; message is safe to show to the user
    Error { message: String },

    /// Always the last frame of a stream
    EndStream,
}

impl StreamEvent {
    pub fn chunk(message: impl Into<String>) -> Self {
        Self::StreamResponse {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Wire tag, e.g. `STREAM_RESPONSE`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StreamResponse { .. } => "STREAM_RESPONSE",
            Self::AddSources { .. } => "ADD_SOURCES",
            Self::AddSignedUrl { .. } => "ADD_SIGNED_URL",
            Self::TriggeredGuard { .. } => "TRIGGERED_GUARD",
            Self::Error { .. } => "ERROR",
            Self::EndStream => "END_STREAM",
        }
    }

    /// Events after which only `END_STREAM` may follow.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TriggeredGuard { .. } | Self::Error { .. } | Self::EndStream
        )
    }

    /// Parse one SSE frame back into an event.
    pub fn from_frame(frame: &str) -> Option<Self> {
        let data = frame.trim_end_matches('\n').strip_prefix("data: ")?;
        serde_json::from_str(data).ok()
    }
}

/// Split a raw SSE body into its events, skipping anything unparseable.
pub fn parse_frames(body: &str) -> Vec<StreamEvent> {
    body.split("\n\n")
        .filter(|frame| !frame.is_empty())
        .filter_map(StreamEvent::from_frame)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(event: &StreamEvent) -> serde_json::Value {
        serde_json::to_value(event).unwrap()
    }

    #[test]
    fn wire_shapes() {
        assert_eq!(
            wire(&StreamEvent::chunk("FIA")),
            json!({"type": "STREAM_RESPONSE", "payload": {"message": "FIA"}})
        );
        assert_eq!(
            wire(&StreamEvent::TriggeredGuard {
                message: "Cannot discuss personnel files".into(),
                guard: vec!["pii".into()],
            }),
            json!({
                "type": "TRIGGERED_GUARD",
                "payload": {"message": "Cannot discuss personnel files", "guard": ["pii"]}
            })
        );
        assert_eq!(
            wire(&StreamEvent::AddSignedUrl {
                signed_url: "https://reports.example.org/r/1".into()
            }),
            json!({"type": "ADD_SIGNED_URL", "payload": {"signed_url": "https://reports.example.org/r/1"}})
        );
        assert_eq!(wire(&StreamEvent::EndStream), json!({"type": "END_STREAM"}));
    }

    #[test]
    fn sources_keep_insertion_order() {
        let mut sources = IndexMap::new();
        sources.insert("Zeta memo".to_string(), "u1".to_string());
        sources.insert("Alpha memo".to_string(), "u2".to_string());

        let json = serde_json::to_string(&StreamEvent::AddSources { sources }).unwrap();
        assert_eq!(
            json,
            r#"{"type":"ADD_SOURCES","payload":{"sources":{"Zeta memo":"u1","Alpha memo":"u2"}}}"#
        );
    }

    #[test]
    fn parse_frames_splits_body() {
        let body = "data: {\"type\":\"STREAM_RESPONSE\",\"payload\":{\"message\":\"a\\n\"}}\n\ndata: {\"type\":\"END_STREAM\"}\n\n";

        assert_eq!(
            parse_frames(body),
            vec![StreamEvent::chunk("a\n"), StreamEvent::EndStream]
        );
    }

    #[test]
    fn terminal_kinds() {
        assert!(StreamEvent::error("x").is_terminal());
        assert!(StreamEvent::EndStream.is_terminal());
        assert!(!StreamEvent::chunk("x").is_terminal());
        assert_eq!(StreamEvent::EndStream.kind(), "END_STREAM");
    }
}
