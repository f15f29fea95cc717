use super::*;
use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;

struct FixedToken(Option<&'static str>);

impl TokenProvider for FixedToken {
    fn current_token(&self) -> Option<String> {
        self.0.map(str::to_owned)
    }
}

async fn spawn_auth_service(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, Router::new().nest("/api", router)).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn gateway(base_url: &str, token: Option<&'static str>) -> HttpAuthGateway {
    HttpAuthGateway::new(base_url, Arc::new(FixedToken(token))).unwrap()
}

fn echo_auth_header(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("<none>")
        .to_owned()
}

// =============================================================================
// attach_auth_header
// =============================================================================

#[test]
fn attach_adds_bearer_when_token_present() {
    let request = reqwest::Client::new().post("http://localhost/x").build().unwrap();
    let request = attach_auth_header(request, &FixedToken(Some("abc")));
    assert_eq!(request.headers().get(AUTHORIZATION).unwrap(), "Bearer abc");
}

#[test]
fn attach_leaves_request_alone_without_token() {
    let request = reqwest::Client::new().post("http://localhost/x").build().unwrap();
    let request = attach_auth_header(request, &FixedToken(None));
    assert!(request.headers().get(AUTHORIZATION).is_none());
}

#[test]
fn attach_skips_token_that_is_not_a_header_value() {
    let request = reqwest::Client::new().post("http://localhost/x").build().unwrap();
    let request = attach_auth_header(request, &FixedToken(Some("bad\ntoken")));
    assert!(request.headers().get(AUTHORIZATION).is_none());
}

// =============================================================================
// body parsing
// =============================================================================

#[test]
fn message_from_body_reads_message_field() {
    assert_eq!(message_from_body(r#"{"message":"User not found"}"#).as_deref(), Some("User not found"));
    assert_eq!(message_from_body(r#"{"message":"   "}"#), None);
    assert_eq!(message_from_body(r#"{"error":"x"}"#), None);
    assert_eq!(message_from_body("<html>502</html>"), None);
}

#[test]
fn session_from_body_accepts_top_level_and_data_envelope() {
    let top = session_from_body(r#"{"token":"t1","user":{"_id":"u1","email":"a@b.c"}}"#).unwrap().unwrap();
    assert_eq!(top.token, "t1");
    assert_eq!(top.user.id, "u1");

    let nested = session_from_body(r#"{"success":true,"data":{"token":"t2","user":{"id":"u2"}}}"#)
        .unwrap()
        .unwrap();
    assert_eq!(nested.token, "t2");
    assert_eq!(nested.user.id, "u2");
}

#[test]
fn session_from_body_without_session_is_none() {
    assert!(session_from_body("").unwrap().is_none());
    assert!(session_from_body(r#"{"message":"Email verified"}"#).unwrap().is_none());
    assert!(session_from_body(r#"{"token":"","user":{"id":"u"}}"#).unwrap().is_none());
    assert!(matches!(session_from_body("not json"), Err(GatewayError::Parse(_))));
}

#[test]
fn session_from_body_reads_users_leniently() {
    let no_id = session_from_body(r#"{"message":"Email verified","user":{"email":"a@b.c"}}"#).unwrap();
    assert!(no_id.is_none());

    let both_ids = session_from_body(r#"{"token":"t","user":{"_id":"x","id":"y","firstName":"A"}}"#)
        .unwrap()
        .unwrap();
    assert_eq!(both_ids.user.id, "y");
    assert_eq!(both_ids.user.first_name, "A");

    let nulls = session_from_body(r#"{"token":"t","user":{"_id":"x","firstName":null,"lastName":7}}"#)
        .unwrap()
        .unwrap();
    assert_eq!(nulls.user.id, "x");
    assert_eq!(nulls.user.first_name, "");
    assert_eq!(nulls.user.last_name, "");

    let no_user = session_from_body(r#"{"token":"t"}"#).unwrap().unwrap();
    assert_eq!(no_user.token, "t");
    assert_eq!(no_user.user, SessionUser::default());
}

#[test]
fn server_message_only_for_rejections_with_text() {
    let rejected = GatewayError::Rejected { status: 400, message: Some("Invalid token".into()) };
    assert_eq!(rejected.server_message(), Some("Invalid token"));
    assert_eq!(GatewayError::Rejected { status: 400, message: None }.server_message(), None);
    assert_eq!(GatewayError::Transport("refused".into()).server_message(), None);
}

#[test]
fn retryable_for_transport_and_server_errors() {
    assert!(GatewayError::Transport("x".into()).retryable());
    assert!(GatewayError::Rejected { status: 503, message: None }.retryable());
    assert!(!GatewayError::Rejected { status: 400, message: None }.retryable());
    assert_eq!(GatewayError::Parse("x".into()).error_code(), "E_GATEWAY_PARSE");
}

// =============================================================================
// HTTP round trips
// =============================================================================

#[tokio::test]
async fn forgot_password_posts_email_with_bearer() {
    let router = Router::new().route(
        "/auth/forgot-password",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let ok = body["email"] == "ana@aley.app" && echo_auth_header(&headers) == "Bearer tok";
            if ok { StatusCode::OK } else { StatusCode::BAD_REQUEST }
        }),
    );
    let base = spawn_auth_service(router).await;
    gateway(&base, Some("tok"))
        .request_password_reset("ana@aley.app")
        .await
        .unwrap();
}

#[tokio::test]
async fn reset_password_sends_token_and_password() {
    let router = Router::new().route(
        "/auth/reset-password",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(echo_auth_header(&headers), "<none>");
            if body["token"] == "rt-1" && body["password"] == "secret1" {
                (StatusCode::OK, Json(json!({ "message": "Password reset" })))
            } else {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": "bad body" })))
            }
        }),
    );
    let base = spawn_auth_service(router).await;
    let token = ResetToken::from_location("/auth/reset-password?token=rt-1").unwrap();
    gateway(&base, None).confirm_password_reset(&token, "secret1").await.unwrap();
}

#[tokio::test]
async fn rejection_carries_server_message() {
    let router = Router::new().route(
        "/auth/verify-email",
        post(|| async { (StatusCode::BAD_REQUEST, Json(json!({ "message": "Token expired" }))) }),
    );
    let base = spawn_auth_service(router).await;
    let token = ResetToken::from_location("/verify-email?token=v1").unwrap();
    let err = gateway(&base, None).verify_email(&token).await.unwrap_err();
    assert!(matches!(err, GatewayError::Rejected { status: 400, .. }));
    assert_eq!(err.server_message(), Some("Token expired"));
}

#[tokio::test]
async fn verify_email_returns_session_when_issued() {
    let router = Router::new().route(
        "/auth/verify-email",
        post(|| async { Json(json!({ "token": "jwt", "user": { "_id": "u9", "email": "a@b.c" } })) }),
    );
    let base = spawn_auth_service(router).await;
    let token = ResetToken::from_location("/verify-email?token=v1").unwrap();
    let session = gateway(&base, None).verify_email(&token).await.unwrap().unwrap();
    assert_eq!(session.token, "jwt");
    assert_eq!(session.user.id, "u9");
}

#[tokio::test]
async fn verify_email_success_with_odd_body_is_still_success() {
    let router = Router::new()
        .route(
            "/auth/verify-email",
            post(|Json(body): Json<Value>| async move {
                if body["token"] == "plain" {
                    Json(json!({ "message": "Email verified", "user": { "email": "a@b.c" } })).into_response()
                } else {
                    (StatusCode::OK, "Email verified").into_response()
                }
            }),
        );
    let base = spawn_auth_service(router).await;
    let gateway = gateway(&base, None);

    let plain = ResetToken::from_location("/verify-email?token=plain").unwrap();
    assert!(gateway.verify_email(&plain).await.unwrap().is_none());

    let text = ResetToken::from_location("/verify-email?token=text").unwrap();
    assert!(gateway.verify_email(&text).await.unwrap().is_none());
}

#[tokio::test]
async fn login_without_session_is_parse_error() {
    let router = Router::new().route("/auth/login", post(|| async { Json(json!({ "ok": true })) }));
    let base = spawn_auth_service(router).await;
    let err = gateway(&base, None).login("a@b.c", "secret1").await.unwrap_err();
    assert!(matches!(err, GatewayError::Parse(_)));
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = gateway(&format!("http://{addr}/api/"), None)
        .resend_verification("a@b.c")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[test]
fn from_config_uses_auth_api_url() {
    let config = crate::config::ServerConfig { port: 5000, auth_api_url: "https://auth.aley.app/api/".into() };
    let gateway = HttpAuthGateway::from_config(&config, Arc::new(FixedToken(None))).unwrap();
    assert_eq!(gateway.base_url(), "https://auth.aley.app/api");
}
