//! Auth gateway: thin client for the remote authentication service.
//!
//! DESIGN
//! ======
//! Flow controllers talk to the [`AuthGateway`] trait so tests can swap in
//! a double. [`HttpAuthGateway`] is the JSON-over-HTTP implementation; it
//! asks its [`TokenProvider`] for a bearer token on every request through
//! the pure [`attach_auth_header`] step.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::session::{Session, SessionUser, TokenProvider};
use super::token::ResetToken;
use crate::config::ServerConfig;
use crate::error::ErrorCode;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The auth service answered with a non-success status.
    #[error("auth service rejected request: status {status}")]
    Rejected { status: u16, message: Option<String> },

    /// The request never produced a response.
    #[error("auth request failed: {0}")]
    Transport(String),

    /// A success response did not have the expected shape.
    #[error("auth response parse failed: {0}")]
    Parse(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl GatewayError {
    /// Human-readable message supplied by the auth service, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message: Some(message), .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

impl ErrorCode for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "E_GATEWAY_REJECTED",
            Self::Transport(_) => "E_GATEWAY_TRANSPORT",
            Self::Parse(_) => "E_GATEWAY_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Rejected { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait AuthGateway: Send + Sync {
    /// Ask the service to email a password-reset link.
    async fn request_password_reset(&self, email: &str) -> Result<(), GatewayError>;

    /// Set a new password using the emailed reset token.
    async fn confirm_password_reset(&self, token: &ResetToken, new_password: &str) -> Result<(), GatewayError>;

    /// Confirm an email address. Some deployments sign the user in at the
    /// same time and return a session.
    async fn verify_email(&self, token: &ResetToken) -> Result<Option<Session>, GatewayError>;

    /// Send a fresh verification link.
    async fn resend_verification(&self, email: &str) -> Result<(), GatewayError>;

    async fn login(&self, email: &str, password: &str) -> Result<Session, GatewayError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// Add `Authorization: Bearer <token>` when the provider has a token.
#[must_use]
pub fn attach_auth_header(mut request: reqwest::Request, tokens: &dyn TokenProvider) -> reqwest::Request {
    let Some(token) = tokens.current_token() else {
        return request;
    };
    match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(mut value) => {
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Err(_) => warn!("auth: stored token is not a valid header value; sending unauthenticated"),
    }
    request
}

pub struct HttpAuthGateway {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpAuthGateway {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), tokens })
    }

    /// Gateway for the service named by `AUTH_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ServerConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, GatewayError> {
        Self::new(&config.auth_api_url, tokens)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json(&self, path: &str, body: &impl Serialize) -> Result<String, GatewayError> {
        let url = format!("{}/auth{}", self.base_url, path);
        let request = self
            .http
            .post(url)
            .json(body)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let request = attach_auth_header(request, self.tokens.as_ref());

        debug!(path, "auth: request");
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "auth: request rejected");
            return Err(GatewayError::Rejected { status: status.as_u16(), message: message_from_body(&text) });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn request_password_reset(&self, email: &str) -> Result<(), GatewayError> {
        self.post_json("/forgot-password", &json!({ "email": email }))
            .await
            .map(drop)
    }

    async fn confirm_password_reset(&self, token: &ResetToken, new_password: &str) -> Result<(), GatewayError> {
        self.post_json("/reset-password", &json!({ "token": token.as_str(), "password": new_password }))
            .await
            .map(drop)
    }

    async fn verify_email(&self, token: &ResetToken) -> Result<Option<Session>, GatewayError> {
        let text = self
            .post_json("/verify-email", &json!({ "token": token.as_str() }))
            .await?;
        // The token is spent once the service answers 2xx; an unreadable
        // body must not turn that into a failure.
        Ok(session_from_body(&text).unwrap_or_else(|e| {
            warn!(error = %e, "auth: verify-email succeeded but its session was unreadable");
            None
        }))
    }

    async fn resend_verification(&self, email: &str) -> Result<(), GatewayError> {
        self.post_json("/resend-verification", &json!({ "email": email }))
            .await
            .map(drop)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let text = self
            .post_json("/login", &json!({ "email": email, "password": password }))
            .await?;
        session_from_body(&text)?.ok_or_else(|| GatewayError::Parse("login response missing token or user".into()))
    }
}

// =============================================================================
// BODY PARSING
// =============================================================================

/// `message` field of an error body, if the body is JSON and carries one.
pub(crate) fn message_from_body(body: &str) -> Option<String> {
    let root: Value = serde_json::from_str(body).ok()?;
    root.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_owned)
}

/// Extract `{token, user}` from the top level or from a `data` envelope.
/// A non-empty `token` is required; the user is read leniently.
pub(crate) fn session_from_body(body: &str) -> Result<Option<Session>, GatewayError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(body).map_err(|e| GatewayError::Parse(e.to_string()))?;
    for candidate in [Some(&root), root.get("data")].into_iter().flatten() {
        let token = candidate
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());
        if let Some(token) = token {
            let user = candidate.get("user").map(SessionUser::from_json).unwrap_or_default();
            return Ok(Some(Session { token: token.to_owned(), user }));
        }
    }
    Ok(None)
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
