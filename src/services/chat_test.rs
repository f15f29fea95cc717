use super::*;
use crate::state::test_helpers::MockLlm;

fn fixed_now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
}

fn request(message: Option<&str>) -> SendMessageRequest {
    SendMessageRequest { message: message.map(str::to_owned), ..SendMessageRequest::default() }
}

// =========================================================================
// send_message
// =========================================================================

#[tokio::test]
async fn send_message_wraps_user_text_behind_system_prompt() {
    let llm = MockLlm::replying("Hi");
    let reply = send_message(Some(&*llm), &ChatDefaults::default(), request(Some("Hello")), fixed_now())
        .await
        .unwrap();

    assert_eq!(reply.reply, "Hi");
    assert_eq!(reply.model, "llama3-70b-8192");
    assert_eq!(reply.conversation_id, "temp-1700000000000");

    let calls = llm.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].messages, vec![Message::system(SYSTEM_PROMPT), Message::user("Hello")]);
    assert_eq!(calls[0].sampling, ChatDefaults::default().sampling);
}

#[tokio::test]
async fn send_message_echoes_conversation_id_and_model_override() {
    let llm = MockLlm::replying("Hi");
    let req = SendMessageRequest {
        message: Some("Hello".into()),
        conversation_id: Some("conv-42".into()),
        model: Some("llama3-8b-8192".into()),
    };
    let reply = send_message(Some(&*llm), &ChatDefaults::default(), req, fixed_now())
        .await
        .unwrap();

    assert_eq!(reply.conversation_id, "conv-42");
    assert_eq!(reply.model, "llama3-8b-8192");
    assert_eq!(llm.calls()[0].model, "llama3-8b-8192");
}

#[tokio::test]
async fn send_message_rejects_missing_or_empty_message_without_upstream_call() {
    let llm = MockLlm::replying("Hi");
    for msg in [None, Some("")] {
        let err = send_message(Some(&*llm), &ChatDefaults::default(), request(msg), fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MessageRequired));
        assert_eq!(err.to_string(), "Message is required");
    }
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn send_message_validates_before_checking_llm() {
    let err = send_message(None, &ChatDefaults::default(), request(None), fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::MessageRequired));

    let err = send_message(None, &ChatDefaults::default(), request(Some("Hello")), fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::LlmNotConfigured));
}

#[tokio::test]
async fn send_message_surfaces_upstream_failure() {
    let llm = MockLlm::failing(503);
    let err = send_message(Some(&*llm), &ChatDefaults::default(), request(Some("Hello")), fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Upstream(LlmError::ApiResponse { status: 503, .. })));
    assert!(err.retryable());
    assert_eq!(err.error_code(), "E_UPSTREAM");
}

// =========================================================================
// direct_chat
// =========================================================================

#[tokio::test]
async fn direct_chat_applies_overrides_and_skips_system_prompt() {
    let llm = MockLlm::replying("pong");
    let req = DirectChatRequest {
        message: Some("ping".into()),
        temperature: Some(0.3),
        max_tokens: Some(64),
        top_p: None,
    };
    let reply = direct_chat(Some(&*llm), &ChatDefaults::default(), req).await.unwrap();
    assert_eq!(reply.response, "pong");

    let call = &llm.calls()[0];
    assert_eq!(call.messages, vec![Message::user("ping")]);
    assert!((call.sampling.temperature - 0.3).abs() < f64::EPSILON);
    assert_eq!(call.sampling.max_tokens, 64);
    assert!((call.sampling.top_p - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn direct_chat_omitted_values_use_direct_sampling_not_send_defaults() {
    let llm = MockLlm::replying("pong");
    let req = DirectChatRequest { message: Some("ping".into()), ..DirectChatRequest::default() };
    direct_chat(Some(&*llm), &ChatDefaults::default(), req).await.unwrap();

    let call = &llm.calls()[0];
    assert_eq!(call.sampling, DIRECT_SAMPLING);
    assert_eq!(call.sampling.max_tokens, 1024);
    assert_ne!(call.sampling, ChatDefaults::default().sampling);
}

#[tokio::test]
async fn direct_chat_rejects_empty_message() {
    let llm = MockLlm::replying("pong");
    let err = direct_chat(Some(&*llm), &ChatDefaults::default(), DirectChatRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::MessageRequired));

    let empty = DirectChatRequest { message: Some(String::new()), ..DirectChatRequest::default() };
    let err = direct_chat(Some(&*llm), &ChatDefaults::default(), empty).await.unwrap_err();
    assert!(matches!(err, ChatError::MessageRequired));
    assert!(llm.calls().is_empty());
}

// =========================================================================
// placeholders
// =========================================================================

#[test]
fn temp_conversation_id_uses_unix_millis() {
    let now = fixed_now() + time::Duration::milliseconds(250);
    assert_eq!(temp_conversation_id(now), "temp-1700000000250");
}

#[test]
fn conversation_history_echoes_id_with_fixed_messages() {
    let now = fixed_now();
    let history = conversation_history("abc", "llama3-70b-8192", now);
    assert_eq!(history.conversation.id, "abc");
    assert_eq!(history.conversation.title, "Sample conversation");
    assert_eq!(history.conversation.updated_at, now);
    assert_eq!(history.messages.len(), 2);
    assert_eq!(history.messages[0].role, Role::User);
    assert_eq!(history.messages[1].content, "Hi! How can I help you today?");
    assert!(history.messages[0].timestamp < history.messages[1].timestamp);
}

#[test]
fn conversations_always_two_entries() {
    let a = conversations("llama3-70b-8192", fixed_now());
    let b = conversations("llama3-70b-8192", fixed_now());
    assert_eq!(a.conversations.len(), 2);
    let ids: Vec<_> = b.conversations.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["conv1", "conv2"]);
}

#[test]
fn conversation_summary_serializes_camel_case_rfc3339() {
    let list = conversations("m", fixed_now());
    let json = serde_json::to_value(&list).unwrap();
    let first = &json["conversations"][0];
    assert_eq!(first["id"], "conv1");
    assert!(first["createdAt"].as_str().unwrap().starts_with("2023-11-13T"));
    assert!(first.get("updatedAt").is_some());
    assert_eq!(json["model"], "m");
}
