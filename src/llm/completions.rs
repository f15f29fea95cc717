//! `/chat/completions` wire format for OpenAI-compatible providers (Groq).

use serde::Serialize;
use serde_json::Value;

use super::types::{ChatResponse, LlmError, Message, Sampling};

// =============================================================================
// REQUEST
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CcRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
    max_completion_tokens: u32,
    top_p: f64,
    stream: bool,
    /// Always serialized; the provider expects an explicit `null`.
    stop: Option<&'a [String]>,
}

impl<'a> CcRequest<'a> {
    pub(crate) fn new(model: &'a str, sampling: &Sampling, messages: &'a [Message]) -> Self {
        Self {
            model,
            messages,
            temperature: sampling.temperature,
            max_completion_tokens: sampling.max_tokens,
            top_p: sampling.top_p,
            stream: false,
            stop: None,
        }
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let model = root
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();
    let input_tokens = root
        .get("usage")
        .and_then(|u| u.get("prompt_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let output_tokens = root
        .get("usage")
        .and_then(|u| u.get("completion_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };
    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop")
        .to_owned();
    let Some(text) = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0].message.content".to_string()));
    };

    Ok(ChatResponse { text: text.to_owned(), model, finish_reason, input_tokens, output_tokens })
}

#[cfg(test)]
#[path = "completions_test.rs"]
mod tests;
