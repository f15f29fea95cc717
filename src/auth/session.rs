//! Signed-in session: bearer token plus the current user.
//!
//! The HTTP gateway never reads storage directly; it asks a
//! [`TokenProvider`] for the current token on every request.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Source of the bearer token attached to outgoing auth requests.
pub trait TokenProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl SessionUser {
    /// Best-effort read of a user object from the auth service. Takes `id`
    /// or `_id`; missing, null or non-string fields become empty.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str);
        Self {
            id: text("id").or_else(|| text("_id")).unwrap_or_default().to_owned(),
            email: text("email").unwrap_or_default().to_owned(),
            first_name: text("firstName").unwrap_or_default().to_owned(),
            last_name: text("lastName").unwrap_or_default().to_owned(),
        }
    }
}

/// `{token, user}` as returned by login and email verification.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("user", &self.user).finish_non_exhaustive()
    }
}

/// In-memory session holder shared by the gateway and the flows.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Option<Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, session: Session) {
        tracing::info!(user_id = %session.user.id, "session: signed in");
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn sign_out(&self) {
        let previous = self.inner.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(session) = previous {
            tracing::info!(user_id = %session.user.id, "session: signed out");
        }
    }

    #[must_use]
    pub fn current_user(&self) -> Option<SessionUser> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_token().is_some()
    }
}

impl TokenProvider for SessionStore {
    fn current_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
