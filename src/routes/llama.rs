//! Llama proxy routes: message relay plus placeholder history endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use time::OffsetDateTime;

use crate::error::ErrorCode;
use crate::services::chat::{self, ChatError, DirectChatRequest, SendMessageRequest};
use crate::state::AppState;

/// Shown to callers instead of the provider's own error text.
const UPSTREAM_FAILURE_MESSAGE: &str = "The assistant is temporarily unavailable. Please try again later.";

pub(crate) fn chat_error_to_status(err: &ChatError) -> StatusCode {
    match err {
        ChatError::MessageRequired => StatusCode::BAD_REQUEST,
        ChatError::LlmNotConfigured | ChatError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn chat_error_response(err: ChatError) -> Response {
    let status = chat_error_to_status(&err);
    if status == StatusCode::BAD_REQUEST {
        return (status, Json(json!({ "error": err.to_string() }))).into_response();
    }
    tracing::error!(error = %err, code = err.error_code(), retryable = err.retryable(), "llama: request failed");
    (status, Json(json!({ "error": "Failed to process request", "message": UPSTREAM_FAILURE_MESSAGE }))).into_response()
}

fn bad_body(rejection: &JsonRejection) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": rejection.body_text() }))).into_response()
}

/// `POST /api/llama/send`: relay one message to the model.
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_body(&rejection),
    };
    match chat::send_message(state.llm.as_deref(), &state.defaults, req, OffsetDateTime::now_utc()).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => chat_error_response(e),
    }
}

/// `POST /api/chat`: relay a bare message with optional sampling overrides.
pub async fn direct_chat(
    State(state): State<AppState>,
    payload: Result<Json<DirectChatRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_body(&rejection),
    };
    match chat::direct_chat(state.llm.as_deref(), &state.defaults, req).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => chat_error_response(e),
    }
}

/// `GET /api/llama/history/{id}`: placeholder history for any id.
pub async fn conversation_history(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    Json(chat::conversation_history(&id, &state.defaults.model, OffsetDateTime::now_utc())).into_response()
}

/// `GET /api/llama/conversations`: placeholder conversation list.
pub async fn conversations(State(state): State<AppState>) -> Response {
    Json(chat::conversations(&state.defaults.model, OffsetDateTime::now_utc())).into_response()
}

#[cfg(test)]
#[path = "llama_test.rs"]
mod tests;
