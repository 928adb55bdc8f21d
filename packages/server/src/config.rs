use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_KNOWLEDGE_HUB_URL: &str =
    "https://lvmhfz2zs4.execute-api.us-east-1.amazonaws.com/test/dla_audit";
pub const DEFAULT_PREDICT_INSIGHT_URL: &str =
    "https://ky6ed9kk6h.execute-api.us-east-1.amazonaws.com/dev/conversation/prompt";
pub const DEFAULT_TRANSACTION_CHAIN_URL: &str =
    "https://qmwnwu2yvl.execute-api.us-east-1.amazonaws.com/dev/analyze";

/// Pacing of the simulated token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    /// Characters per `STREAM_RESPONSE` event. Always at least 1.
    pub chunk_size: usize,
    /// Pause between consecutive chunks.
    pub chunk_delay: Duration,
    /// Word budget passed to the summarize endpoint.
    pub summary_max_length: u32,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            chunk_size: 3,
            chunk_delay: Duration::from_millis(15),
            summary_max_length: 200,
        }
    }
}

/// External APIs the proxy routes forward to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamUrls {
    pub knowledge_hub: String,
    pub predict_insight: String,
    pub transaction_chain: String,
}

impl Default for UpstreamUrls {
    fn default() -> Self {
        Self {
            knowledge_hub: DEFAULT_KNOWLEDGE_HUB_URL.to_string(),
            predict_insight: DEFAULT_PREDICT_INSIGHT_URL.to_string(),
            transaction_chain: DEFAULT_TRANSACTION_CHAIN_URL.to_string(),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub knowledge_endpoint: String,
    /// Streaming text-generation endpoint; unset means the summary is replayed in chunks
    pub inference_endpoint: Option<String>,
    pub upstreams: UpstreamUrls,
    pub stream: StreamSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = StreamSettings::default();
        let upstreams = UpstreamUrls::default();

        let chunk_size: usize = parse_or(&lookup, "STREAM_CHUNK_SIZE", defaults.chunk_size)?;
        ensure!(chunk_size >= 1, "STREAM_CHUNK_SIZE must be at least 1");

        let chunk_delay_ms: u64 = parse_or(
            &lookup,
            "STREAM_CHUNK_DELAY_MS",
            defaults.chunk_delay.as_millis() as u64,
        )?;

        Ok(Self {
            port: parse_or(&lookup, "PORT", 8080)?,
            knowledge_endpoint: lookup("KNOWLEDGE_ENDPOINT")
                .filter(|v| !v.is_empty())
                .context("KNOWLEDGE_ENDPOINT must be set")?,
            inference_endpoint: lookup("INFERENCE_ENDPOINT").filter(|v| !v.is_empty()),
            upstreams: UpstreamUrls {
                knowledge_hub: lookup("KNOWLEDGE_HUB_URL").unwrap_or(upstreams.knowledge_hub),
                predict_insight: lookup("PREDICT_INSIGHT_URL")
                    .unwrap_or(upstreams.predict_insight),
                transaction_chain: lookup("TRANSACTION_CHAIN_URL")
                    .unwrap_or(upstreams.transaction_chain),
            },
            stream: StreamSettings {
                chunk_size,
                chunk_delay: Duration::from_millis(chunk_delay_ms),
                summary_max_length: parse_or(
                    &lookup,
                    "SUMMARY_MAX_LENGTH",
                    defaults.summary_max_length,
                )?,
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_endpoint_is_set() {
        let config =
            Config::from_lookup(lookup(&[("KNOWLEDGE_ENDPOINT", "http://kb:8000")])).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.knowledge_endpoint, "http://kb:8000");
        assert_eq!(config.stream, StreamSettings::default());
        assert_eq!(config.upstreams, UpstreamUrls::default());
        assert!(config.inference_endpoint.is_none());
    }

    #[test]
    fn knowledge_endpoint_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("KNOWLEDGE_ENDPOINT"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("KNOWLEDGE_ENDPOINT", "http://kb:8000"),
            ("PORT", "3001"),
            ("STREAM_CHUNK_SIZE", "5"),
            ("STREAM_CHUNK_DELAY_MS", "0"),
            ("SUMMARY_MAX_LENGTH", "120"),
            ("TRANSACTION_CHAIN_URL", "http://chain:9000/analyze"),
            ("INFERENCE_ENDPOINT", "http://llm:8080/generate"),
        ]))
        .unwrap();

        assert_eq!(
            config.inference_endpoint.as_deref(),
            Some("http://llm:8080/generate")
        );
        assert_eq!(config.port, 3001);
        assert_eq!(config.stream.chunk_size, 5);
        assert_eq!(config.stream.chunk_delay, Duration::ZERO);
        assert_eq!(config.stream.summary_max_length, 120);
        assert_eq!(config.upstreams.transaction_chain, "http://chain:9000/analyze");
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("KNOWLEDGE_ENDPOINT", "http://kb:8000"),
            ("STREAM_CHUNK_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("STREAM_CHUNK_SIZE"));
    }

    #[test]
    fn malformed_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("KNOWLEDGE_ENDPOINT", "http://kb:8000"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
