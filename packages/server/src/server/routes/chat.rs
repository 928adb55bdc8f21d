//! SSE chat endpoint.
//!
//! GET /api/chat?message=&appType=&currentUser=&systemPrompt=
//!
//! The answer is produced by a task writing into a channel; the channel's
//! receiver is the SSE body. Each event is one `data: <json>` frame.

use std::convert::Infallible;

use axum::{
    extract::{Extension, Query},
    http::header,
    response::{
        sse::{KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::StreamExt;
use tracing::Instrument;

use crate::domains::chat::{stream_chat, ChannelSink, ChatRequest};
use crate::server::app::AxumAppState;

/// Frames buffered ahead of a slow client
const STREAM_BUFFER: usize = 32;

/// The query is read as raw pairs so that no query string can fail the
/// request before the stream opens; repeated keys keep their first value.
pub async fn chat_handler(
    Extension(state): Extension<AxumAppState>,
    query: Option<Query<Vec<(String, String)>>>,
) -> Response {
    let pairs = query.map(|Query(pairs)| pairs).unwrap_or_default();
    let request = ChatRequest::from_query_pairs(pairs);

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);
    span.in_scope(|| {
        tracing::info!(
            app_type = request.app_type.as_deref().unwrap_or(""),
            current_user = request.current_user.as_deref().unwrap_or(""),
            "New chat message"
        )
    });

    let (sink, frames) = ChannelSink::channel(STREAM_BUFFER);
    tokio::spawn(stream_chat(state.deps.clone(), request, sink).instrument(span));

    let sse = Sse::new(frames.map(Ok::<_, Infallible>)).keep_alive(KeepAlive::default());
    (
        [
            (header::CACHE_CONTROL, "no-cache, no-transform"),
            (header::CONNECTION, "keep-alive"),
        ],
        sse,
    )
        .into_response()
}
