//! Request-scoped chat models. Nothing here outlives a single response stream.

use knowledge_client::KnowledgeSource;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions about the system.";

/// Query parameters of `GET /api/chat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub app_type: Option<String>,
    pub current_user: Option<String>,
    pub system_prompt: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Build from decoded query pairs. The first value of a repeated key
    /// wins; unknown keys are ignored.
    pub fn from_query_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut request = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "message" => &mut request.message,
                "appType" => &mut request.app_type,
                "currentUser" => &mut request.current_user,
                "systemPrompt" => &mut request.system_prompt,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        request
    }

    /// The system prompt, falling back to the default when absent or blank.
    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}

/// Knowledge + summary bundle used to answer one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatContext {
    /// Summarized answer text
    pub llm_prompt: String,
    pub sources: Vec<KnowledgeSource>,
    pub triggered_guards: Vec<String>,
    pub report_url: Option<String>,
}
