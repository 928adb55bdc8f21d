use tracing::warn;

use crate::domains::chat::events::StreamEvent;
use crate::domains::chat::models::ChatContext;

/// `TRIGGERED_GUARD` event for a context the knowledge service flagged, or
/// `None` when the answer may be streamed.
pub fn inspect_guards(context: &ChatContext) -> Option<StreamEvent> {
    if context.triggered_guards.is_empty() {
        return None;
    }

    warn!(guards = ?context.triggered_guards, "Knowledge guard triggered, withholding answer");
    Some(StreamEvent::TriggeredGuard {
        message: context.llm_prompt.clone(),
        guard: context.triggered_guards.clone(),
    })
}
