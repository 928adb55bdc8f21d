//! Per-request chat stream.
//!
//! `INIT -> RESOLVING_CONTEXT -> {GUARD_TRIGGERED | STREAMING} -> CLOSED`
//!
//! The answer is either generated token by token, when an inference stream is
//! configured, or the summary replayed in paced chunks.
//!
//! A failure while resolving is reported once as `ERROR`. Whatever happens,
//! the stream ends with a single `END_STREAM`. There are no retries.

use tracing::{debug, error, info};

use super::{
    emit_attachments, emit_chunks, inference_request, inspect_guards, relay_tokens,
    resolve_context,
};
use crate::domains::chat::error::ChatError;
use crate::domains::chat::events::StreamEvent;
use crate::domains::chat::models::ChatRequest;
use crate::domains::chat::transport::{EventWriter, ResponseSink, SinkError};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Init,
    ResolvingContext,
    GuardTriggered,
    Streaming,
    Closed,
}

/// How a chat stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    Streamed { chunks: usize },
    GuardTriggered,
    Failed,
    /// The client stopped reading before the stream finished
    Disconnected,
}

struct PhaseTracker(ChatPhase);

impl PhaseTracker {
    fn enter(&mut self, next: ChatPhase) {
        debug!(from = ?self.0, to = ?next, "Chat phase");
        self.0 = next;
    }
}

/// Answer one chat request onto `sink`.
pub async fn stream_chat<S: ResponseSink>(
    deps: ServerDeps,
    request: ChatRequest,
    sink: S,
) -> ChatOutcome {
    let mut writer = EventWriter::new(sink);
    let mut phase = PhaseTracker(ChatPhase::Init);

    let outcome = match run(&deps, &request, &mut writer, &mut phase).await {
        Ok(outcome) => outcome,
        Err(ChatError::Sink(SinkError::Closed)) => {
            info!(phase = ?phase.0, "Client disconnected, stopping stream");
            ChatOutcome::Disconnected
        }
        Err(e) => {
            error!(error = %e, phase = ?phase.0, "Chat request failed");
            match writer.send(StreamEvent::error(e.client_message())).await {
                Ok(()) => ChatOutcome::Failed,
                Err(_) => ChatOutcome::Disconnected,
            }
        }
    };

    // Cleanup runs on every path
    if let Err(e) = writer.finish().await {
        debug!(error = %e, "END_STREAM not delivered");
    }
    phase.enter(ChatPhase::Closed);

    info!(?outcome, frames = writer.written(), "Chat stream closed");
    outcome
}

async fn run<S: ResponseSink>(
    deps: &ServerDeps,
    request: &ChatRequest,
    writer: &mut EventWriter<S>,
    phase: &mut PhaseTracker,
) -> Result<ChatOutcome, ChatError> {
    phase.enter(ChatPhase::ResolvingContext);
    let context = resolve_context(
        deps.knowledge.as_ref(),
        request,
        deps.stream.summary_max_length,
    )
    .await?;

    if let Some(event) = inspect_guards(&context) {
        phase.enter(ChatPhase::GuardTriggered);
        writer.send(event).await?;
        return Ok(ChatOutcome::GuardTriggered);
    }

    phase.enter(ChatPhase::Streaming);
    let chunks = match deps.inference.as_deref() {
        Some(inference) => {
            let generation = inference_request(
                request.system_prompt(),
                &context.llm_prompt,
                request.message.as_deref().unwrap_or_default(),
            );
            let tokens = inference.stream(&generation).await?;
            relay_tokens(tokens, writer).await?
        }
        None => {
            emit_chunks(
                writer,
                &context.llm_prompt,
                deps.stream.chunk_size,
                deps.stream.chunk_delay,
            )
            .await?
        }
    };
    emit_attachments(writer, &context).await?;

    Ok(ChatOutcome::Streamed { chunks })
}
