//! Chat proxy service: relays a user message to the Llama completion API.
//!
//! DESIGN
//! ======
//! Every call is independent: the fixed system prompt plus the single user
//! message are sent upstream and nothing is remembered afterwards. The
//! history and conversation-list operations return fixed synthetic data
//! and do not consult any store.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::config::ChatDefaults;
use crate::llm::types::{LlmError, Message, Role, Sampling};

/// Sampling for `POST /api/chat` when the request leaves a value out.
pub const DIRECT_SAMPLING: Sampling = Sampling { temperature: 1.0, max_tokens: 1024, top_p: 1.0 };

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant for Aley social media platform users. Provide accurate, concise, and helpful responses.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message is required")]
    MessageRequired,
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("upstream error: {0}")]
    Upstream(#[from] LlmError),
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MessageRequired => "E_MESSAGE_REQUIRED",
            Self::LlmNotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::Upstream(_) => "E_UPSTREAM",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Upstream(e) if e.retryable())
    }
}

/// Body of `POST /api/llama/send`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageReply {
    pub reply: String,
    pub conversation_id: String,
    pub model: String,
}

/// Body of `POST /api/chat`: a bare message with optional sampling overrides.
#[derive(Debug, Default, Deserialize)]
pub struct DirectChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectChatReply {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationHistory {
    pub conversation: ConversationSummary,
    pub messages: Vec<HistoryMessage>,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationList {
    pub conversations: Vec<ConversationSummary>,
    pub model: String,
}

// =============================================================================
// SEND
// =============================================================================

/// Forward `req.message` upstream behind [`SYSTEM_PROMPT`].
///
/// # Errors
///
/// [`ChatError::MessageRequired`] for a missing or empty message (no upstream
/// call is made); [`ChatError::Upstream`] when the completion API fails.
pub async fn send_message(
    llm: Option<&dyn LlmChat>,
    defaults: &ChatDefaults,
    req: SendMessageRequest,
    now: OffsetDateTime,
) -> Result<SendMessageReply, ChatError> {
    let message = req
        .message
        .filter(|m| !m.is_empty())
        .ok_or(ChatError::MessageRequired)?;
    let llm = llm.ok_or(ChatError::LlmNotConfigured)?;

    let model = req
        .model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| defaults.model.clone());
    let conversation_id = req
        .conversation_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| temp_conversation_id(now));

    info!(%model, %conversation_id, message_len = message.len(), "chat: relaying message");
    let messages = [Message::system(SYSTEM_PROMPT), Message::user(message)];
    let response = llm.chat(&model, &defaults.sampling, &messages).await?;
    info!(
        %model,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "chat: reply received"
    );

    Ok(SendMessageReply { reply: response.text, conversation_id, model })
}

/// Relay a bare user message with per-request sampling overrides. Values
/// the request omits come from [`DIRECT_SAMPLING`], not the `/send` defaults.
///
/// # Errors
///
/// Same as [`send_message`].
pub async fn direct_chat(
    llm: Option<&dyn LlmChat>,
    defaults: &ChatDefaults,
    req: DirectChatRequest,
) -> Result<DirectChatReply, ChatError> {
    let message = req
        .message
        .filter(|m| !m.is_empty())
        .ok_or(ChatError::MessageRequired)?;
    let llm = llm.ok_or(ChatError::LlmNotConfigured)?;

    let sampling = Sampling {
        temperature: req.temperature.unwrap_or(DIRECT_SAMPLING.temperature),
        max_tokens: req.max_tokens.unwrap_or(DIRECT_SAMPLING.max_tokens),
        top_p: req.top_p.unwrap_or(DIRECT_SAMPLING.top_p),
    };
    let response = llm
        .chat(&defaults.model, &sampling, &[Message::user(message)])
        .await
        .inspect_err(|e| warn!(error = %e, "chat: direct relay failed"))?;
    Ok(DirectChatReply { response: response.text })
}

/// Identifier handed out when the caller did not supply one.
#[must_use]
pub fn temp_conversation_id(now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!("temp-{millis}")
}

// =============================================================================
// PLACEHOLDER HISTORY
// =============================================================================

/// Synthetic history for `id`. The id is echoed; nothing else depends on it.
#[must_use]
pub fn conversation_history(id: &str, model: &str, now: OffsetDateTime) -> ConversationHistory {
    let started = now - time::Duration::hours(1);
    ConversationHistory {
        conversation: ConversationSummary {
            id: id.to_owned(),
            title: "Sample conversation".into(),
            created_at: started,
            updated_at: now,
        },
        messages: vec![
            HistoryMessage { role: Role::User, content: "Hello there".into(), timestamp: started },
            HistoryMessage {
                role: Role::Assistant,
                content: "Hi! How can I help you today?".into(),
                timestamp: started + time::Duration::seconds(10),
            },
        ],
        model: model.to_owned(),
    }
}

/// Synthetic conversation list; always the same two entries.
#[must_use]
pub fn conversations(model: &str, now: OffsetDateTime) -> ConversationList {
    let day = time::Duration::days(1);
    ConversationList {
        conversations: vec![
            ConversationSummary {
                id: "conv1".into(),
                title: "First conversation".into(),
                created_at: now - day,
                updated_at: now,
            },
            ConversationSummary {
                id: "conv2".into(),
                title: "Second conversation".into(),
                created_at: now - day * 2,
                updated_at: now - day,
            },
        ],
        model: model.to_owned(),
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
