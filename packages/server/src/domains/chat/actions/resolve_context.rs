//! Resolve a chat question into a [`ChatContext`]: knowledge lookup, then summary.

use tracing::{debug, info};

use crate::domains::chat::error::ChatError;
use crate::domains::chat::models::{ChatContext, ChatRequest};
use crate::kernel::BaseKnowledgeService;

/// Look up knowledge for the request's message and summarize it.
///
/// The two calls run strictly one after the other. An empty or missing
/// message fails before anything is sent.
pub async fn resolve_context(
    knowledge: &dyn BaseKnowledgeService,
    request: &ChatRequest,
    summary_max_length: u32,
) -> Result<ChatContext, ChatError> {
    let message = request
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ChatError::Validation("No message provided".into()))?;

    debug!(
        app_type = request.app_type.as_deref().unwrap_or(""),
        current_user = request.current_user.as_deref().unwrap_or(""),
        system_prompt = request.system_prompt(),
        "Resolving chat context"
    );

    let knowledge_response = knowledge.knowledge(message).await?;
    let summary = knowledge
        .summarize(&knowledge_response, summary_max_length)
        .await?;

    let context = ChatContext {
        llm_prompt: summary.summary.unwrap_or_default(),
        sources: knowledge_response.sources.unwrap_or_default(),
        triggered_guards: knowledge_response.triggered_guards.unwrap_or_default(),
        report_url: knowledge_response.report_url,
    };

    info!(
        prompt_chars = context.llm_prompt.chars().count(),
        sources = context.sources.len(),
        guards = context.triggered_guards.len(),
        "Chat context resolved"
    );

    Ok(context)
}
