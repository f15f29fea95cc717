use super::*;

#[test]
fn pending_settles_to_next_state() {
    let mut state = FlowState::Idle;
    let pending = Pending::begin(&mut state);
    pending.settle(FlowState::Succeeded);
    assert_eq!(state, FlowState::Succeeded);
}

#[test]
fn dropped_pending_restores_previous_state() {
    let mut state = FlowState::Failed("earlier".into());
    {
        let _pending = Pending::begin(&mut state);
    }
    assert_eq!(state.error_message(), Some("earlier"));
}

#[test]
fn failure_message_prefers_server_text() {
    let with_text = GatewayError::Rejected { status: 404, message: Some("No account with that email".into()) };
    assert_eq!(failure_message(&with_text, "fallback"), "No account with that email");

    let without = GatewayError::Rejected { status: 500, message: None };
    assert_eq!(failure_message(&without, "fallback"), "fallback");
    assert_eq!(failure_message(&GatewayError::Transport("reset".into()), "fallback"), "fallback");
}

#[test]
fn flow_error_codes_follow_source() {
    let err = FlowError::Gateway {
        message: "x".into(),
        source: GatewayError::Transport("refused".into()),
    };
    assert_eq!(err.error_code(), "E_GATEWAY_TRANSPORT");
    assert_eq!(FlowError::MissingToken.error_code(), "E_MISSING_TOKEN");
    assert_eq!(err.to_string(), "x");
}

#[test]
fn routes_have_paths() {
    assert_eq!(Route::Login.path(), "/auth/login");
    assert_eq!(Route::Dashboard.path(), "/dashboard");
}
