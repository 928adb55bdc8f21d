//! Transport adapter between the chat pipeline and an HTTP response body.
//!
//! The pipeline only ever talks to an [`EventWriter`], which encodes events
//! and enforces stream closure rules. The writer sits on a [`ResponseSink`]:
//! a channel of SSE events feeding an axum [`Sse`](axum::response::sse::Sse)
//! body in production, or an in-memory recorder in tests.

use async_trait::async_trait;
use axum::response::sse::Event;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::events::StreamEvent;

#[derive(Debug, Error)]
pub enum SinkError {
    /// The receiving side is gone (client disconnected or stream finished)
    #[error("response stream closed")]
    Closed,

    #[error("{0} already sent; only END_STREAM may follow")]
    AfterTerminal(&'static str),

    #[error("failed to encode event: {0}")]
    Encode(#[from] axum::Error),
}

/// Destination of a response stream.
#[async_trait]
pub trait ResponseSink: Send {
    /// What one event becomes on this sink
    type Frame: Send;

    fn encode(event: &StreamEvent) -> Result<Self::Frame, SinkError>;

    async fn write(&mut self, frame: Self::Frame) -> Result<(), SinkError>;

    /// Release the destination. Further writes fail with `Closed`.
    async fn close(&mut self);
}

// =============================================================================
// Channel sink (HTTP)
// =============================================================================

/// Sink whose receiver becomes the SSE response body.
///
/// When the client disconnects the body, and with it the receiver, is
/// dropped, so the next write reports `Closed`.
pub struct ChannelSink {
    tx: Option<mpsc::Sender<Event>>,
}

impl ChannelSink {
    pub fn channel(buffer: usize) -> (Self, ReceiverStream<Event>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx: Some(tx) }, ReceiverStream::new(rx))
    }
}

#[async_trait]
impl ResponseSink for ChannelSink {
    type Frame = Event;

    fn encode(event: &StreamEvent) -> Result<Event, SinkError> {
        Ok(Event::default().json_data(event)?)
    }

    async fn write(&mut self, frame: Event) -> Result<(), SinkError> {
        let tx = self.tx.as_ref().ok_or(SinkError::Closed)?;
        tx.send(frame).await.map_err(|_| SinkError::Closed)
    }

    async fn close(&mut self) {
        self.tx.take();
    }
}

// =============================================================================
// Event writer
// =============================================================================

/// Encodes events onto a sink and guarantees orderly closure.
///
/// - at most one `ERROR` / `TRIGGERED_GUARD`, followed only by `END_STREAM`
/// - `END_STREAM` is written once, by [`EventWriter::finish`], and closes the sink
/// - nothing is written after closure
pub struct EventWriter<S: ResponseSink> {
    sink: S,
    terminal: Option<&'static str>,
    closed: bool,
    written: usize,
}

impl<S: ResponseSink> EventWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            terminal: None,
            closed: false,
            written: 0,
        }
    }

    pub async fn send(&mut self, event: StreamEvent) -> Result<(), SinkError> {
        if matches!(event, StreamEvent::EndStream) {
            return self.finish().await;
        }
        if self.closed {
            return Err(SinkError::Closed);
        }
        if let Some(kind) = self.terminal {
            return Err(SinkError::AfterTerminal(kind));
        }

        let frame = S::encode(&event)?;
        if let Err(e) = self.sink.write(frame).await {
            self.closed = true;
            self.sink.close().await;
            return Err(e);
        }

        self.written += 1;
        if event.is_terminal() {
            self.terminal = Some(event.kind());
        }
        Ok(())
    }

    /// Write `END_STREAM` and close the sink. Safe to call more than once;
    /// only the first call writes.
    pub async fn finish(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = match S::encode(&StreamEvent::EndStream) {
            Ok(frame) => self.sink.write(frame).await,
            Err(e) => Err(e),
        };
        if result.is_ok() {
            self.written += 1;
        }
        self.sink.close().await;
        result
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Frames successfully handed to the sink
    pub fn written(&self) -> usize {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MemorySink;
    use axum::response::{sse::Sse, IntoResponse};
    use futures::StreamExt;
    use std::convert::Infallible;

    #[tokio::test]
    async fn finish_is_idempotent() {
        let sink = MemorySink::new();
        let mut writer = EventWriter::new(sink.clone());

        writer.send(StreamEvent::chunk("abc")).await.unwrap();
        writer.finish().await.unwrap();
        writer.finish().await.unwrap();
        writer.send(StreamEvent::EndStream).await.unwrap();

        assert_eq!(
            sink.events(),
            vec![StreamEvent::chunk("abc"), StreamEvent::EndStream]
        );
        assert!(sink.is_closed());
        assert_eq!(writer.written(), 2);
    }

    #[tokio::test]
    async fn nothing_after_close() {
        let sink = MemorySink::new();
        let mut writer = EventWriter::new(sink.clone());

        writer.finish().await.unwrap();
        let err = writer.send(StreamEvent::chunk("late")).await.unwrap_err();

        assert!(matches!(err, SinkError::Closed));
        assert_eq!(sink.events(), vec![StreamEvent::EndStream]);
    }

    #[tokio::test]
    async fn only_end_stream_follows_a_terminal_event() {
        let sink = MemorySink::new();
        let mut writer = EventWriter::new(sink.clone());

        writer.send(StreamEvent::error("boom")).await.unwrap();
        let err = writer.send(StreamEvent::chunk("more")).await.unwrap_err();
        assert!(matches!(err, SinkError::AfterTerminal("ERROR")));

        writer.finish().await.unwrap();
        assert_eq!(
            sink.events(),
            vec![StreamEvent::error("boom"), StreamEvent::EndStream]
        );
    }

    #[tokio::test]
    async fn write_failure_closes_writer() {
        let sink = MemorySink::disconnect_after(1);
        let mut writer = EventWriter::new(sink.clone());

        writer.send(StreamEvent::chunk("one")).await.unwrap();
        let err = writer.send(StreamEvent::chunk("two")).await.unwrap_err();

        assert!(matches!(err, SinkError::Closed));
        assert!(writer.is_closed());
        assert!(sink.is_closed());
        // Best-effort close does not write again
        writer.finish().await.unwrap();
        assert_eq!(sink.events(), vec![StreamEvent::chunk("one")]);
    }

    #[tokio::test]
    async fn channel_sink_renders_sse_frames() {
        let (sink, frames) = ChannelSink::channel(8);
        let mut writer = EventWriter::new(sink);

        writer.send(StreamEvent::chunk("abc")).await.unwrap();
        writer.finish().await.unwrap();

        let response = Sse::new(frames.map(Ok::<_, Infallible>)).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            &body[..],
            &b"data: {\"type\":\"STREAM_RESPONSE\",\"payload\":{\"message\":\"abc\"}}\n\n\
               data: {\"type\":\"END_STREAM\"}\n\n"[..]
        );
    }

    #[tokio::test]
    async fn channel_sink_reports_dropped_receiver() {
        let (mut sink, body) = ChannelSink::channel(1);
        drop(body);

        let err = sink.write(Event::default().data("x")).await.unwrap_err();
        assert!(matches!(err, SinkError::Closed));
    }
}
