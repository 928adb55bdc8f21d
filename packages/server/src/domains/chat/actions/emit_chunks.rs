//! Chunked emission of a resolved answer, plus the trailing source/report events.

use indexmap::IndexMap;
use knowledge_client::KnowledgeSource;
use std::time::Duration;

use crate::domains::chat::events::StreamEvent;
use crate::domains::chat::models::ChatContext;
use crate::domains::chat::transport::{EventWriter, ResponseSink, SinkError};

/// Split `text` into consecutive pieces of `chunk_size` characters.
///
/// Pieces never split a character; the last one may be shorter. A
/// `chunk_size` of 0 is treated as 1.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(text.len() / chunk_size + 1);
    let mut start = 0;

    for (count, (idx, _)) in text.char_indices().enumerate() {
        if count > 0 && count % chunk_size == 0 {
            chunks.push(&text[start..idx]);
            start = idx;
        }
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Emit one `STREAM_RESPONSE` per chunk, pausing `delay` between chunks.
pub async fn emit_chunks<S: ResponseSink>(
    writer: &mut EventWriter<S>,
    text: &str,
    chunk_size: usize,
    delay: Duration,
) -> Result<usize, SinkError> {
    let chunks = chunk_text(text, chunk_size);
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        writer.send(StreamEvent::chunk(*chunk)).await?;
    }
    Ok(chunks.len())
}

/// Title -> URI map of the usable sources.
///
/// Entries without both fields are skipped. A repeated title keeps its first
/// position but takes the last URI.
pub fn collect_sources(sources: &[KnowledgeSource]) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for source in sources {
        match (source.document_title.as_deref(), source.document_uri.as_deref()) {
            (Some(title), Some(uri)) if !title.is_empty() && !uri.is_empty() => {
                map.insert(title.to_string(), uri.to_string());
            }
            _ => {}
        }
    }
    map
}

/// Emit `ADD_SOURCES` and `ADD_SIGNED_URL` for a streamed answer, when there
/// is anything to attach.
pub async fn emit_attachments<S: ResponseSink>(
    writer: &mut EventWriter<S>,
    context: &ChatContext,
) -> Result<(), SinkError> {
    let sources = collect_sources(&context.sources);
    if !sources.is_empty() {
        writer.send(StreamEvent::AddSources { sources }).await?;
    }

    if let Some(url) = context.report_url.as_deref().filter(|u| !u.is_empty()) {
        tracing::debug!(report_url = url, "Attaching report link");
        writer
            .send(StreamEvent::AddSignedUrl {
                signed_url: url.to_string(),
            })
            .await?;
    }
    Ok(())
}
