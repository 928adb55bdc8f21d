//! Relay tokens from a streaming inference endpoint as `STREAM_RESPONSE` events.

use futures::{Stream, StreamExt};
use knowledge_client::InferenceRequest;
use tracing::error;

use crate::domains::chat::events::StreamEvent;
use crate::domains::chat::transport::{EventWriter, ResponseSink, SinkError};

/// Generation request answering `question` from the resolved summary.
pub fn inference_request(system_prompt: &str, context: &str, question: &str) -> InferenceRequest {
    InferenceRequest::streaming(format!(
        "{}\n\nContext:\n{}\n\nQuestion: {}\nAnswer:",
        system_prompt, context, question
    ))
}

/// Forward every decoded token to the writer.
///
/// A decode or transport error on the inference side ends the relay; what was
/// already sent stays sent. Returns the number of tokens forwarded.
pub async fn relay_tokens<S, St>(tokens: St, writer: &mut EventWriter<S>) -> Result<usize, SinkError>
where
    S: ResponseSink,
    St: Stream<Item = knowledge_client::Result<String>>,
{
    futures::pin_mut!(tokens);
    let mut relayed = 0;

    while let Some(token) = tokens.next().await {
        match token {
            Ok(text) => {
                writer.send(StreamEvent::chunk(text)).await?;
                relayed += 1;
            }
            Err(e) => {
                error!(error = %e, relayed, "Error processing inference stream");
                break;
            }
        }
    }
    Ok(relayed)
}
