//! Decoder for streamed inference payload parts.
//!
//! Inference endpoints that stream text-generation output send newline
//! separated JSON objects, optionally prefixed with `data:`, of the form
//! `{"token": {"text": "..."}, ...}`. [`TokenStream`] turns the raw byte
//! stream into the text of each token. Partial lines are buffered across
//! payload parts, so a token split over two parts is still decoded once.

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::KnowledgeError;

/// End-of-turn marker some models emit as a regular token.
pub const END_OF_TURN: &str = "<|eot_id|>";

#[derive(Debug, serde::Deserialize)]
struct PayloadLineRaw {
    token: Option<TokenRaw>,
}

#[derive(Debug, serde::Deserialize)]
struct TokenRaw {
    #[serde(default)]
    text: Option<String>,
}

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, String>> + Send>>;

/// Stream adapter that converts raw payload parts into token text.
pub struct TokenStream {
    inner: ByteStream,
    buffer: Vec<u8>,
    finished: bool,
}

impl TokenStream {
    pub fn new<S, E>(byte_stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Display,
    {
        Self {
            inner: Box::pin(byte_stream.map(|r| r.map_err(|e| e.to_string()))),
            buffer: Vec::new(),
            finished: false,
        }
    }
}

impl Stream for TokenStream {
    type Item = Result<String, KnowledgeError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(token) = next_token(&mut this.buffer, this.finished) {
                return Poll::Ready(Some(token));
            }
            if this.finished {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(KnowledgeError::Network(e))));
                }
                // Flush whatever is left without a trailing newline.
                Poll::Ready(None) => this.finished = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Pull the next token out of the buffer.
///
/// Only complete lines are consumed unless `flush` is set, in which case the
/// remainder is treated as a final line.
fn next_token(buffer: &mut Vec<u8>, flush: bool) -> Option<Result<String, KnowledgeError>> {
    loop {
        let line: Vec<u8> = match buffer.iter().position(|b| *b == b'\n') {
            Some(pos) => buffer.drain(..=pos).collect(),
            None if flush && !buffer.is_empty() => std::mem::take(buffer),
            None => return None,
        };

        let line = match std::str::from_utf8(&line) {
            Ok(line) => line.trim(),
            Err(e) => {
                return Some(Err(KnowledgeError::Parse(format!(
                    "Invalid UTF-8 in payload part: {}",
                    e
                ))))
            }
        };

        let data = line.strip_prefix("data:").unwrap_or(line).trim();
        if data.is_empty() || !data.contains("\"token\"") {
            continue;
        }

        match serde_json::from_str::<PayloadLineRaw>(data) {
            Ok(raw) => {
                let text = raw.token.and_then(|t| t.text).unwrap_or_default();
                if text.is_empty() || text == END_OF_TURN {
                    continue;
                }
                return Some(Ok(text));
            }
            Err(e) => {
                return Some(Err(KnowledgeError::Parse(format!(
                    "Failed to parse payload part: {} (data: {})",
                    e,
                    data.chars().take(200).collect::<String>()
                ))));
            }
        }
    }
}
