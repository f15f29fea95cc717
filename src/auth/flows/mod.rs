//! Flow controllers: one state machine per account-recovery screen.
//!
//! DESIGN
//! ======
//! Each controller owns its form, its [`FlowState`] and (where the screen
//! navigates afterwards) a [`RedirectTimer`]. Controllers are driven through
//! `&mut self`, so a controller can never have two gateway calls in flight;
//! while a call is outstanding the state reads `Submitting`.
//!
//! SYSTEM CONTEXT
//! ==============
//! A front end renders `state()`/`form()` and forwards user events. Network
//! access goes through [`AuthGateway`](super::gateway::AuthGateway) and
//! navigation through [`Navigator`], both injected as trait objects.
//!
//! CANCELLATION
//! ============
//! Dropping an in-flight `submit` future discards the late result and puts
//! the state back where it was before the call. `teardown()` (or dropping
//! the controller) cancels a pending redirect.

pub mod forgot_password;
pub mod redirect;
pub mod reset_password;
pub mod verify_email;

use std::mem;
use std::time::Duration;

pub use forgot_password::ForgotPasswordFlow;
pub use redirect::RedirectTimer;
pub use reset_password::ResetPasswordFlow;
pub use verify_email::VerifyEmailFlow;

use super::gateway::GatewayError;
use super::validate::ErrorSet;
use crate::error::ErrorCode;

/// Delay between a successful reset/verification and the follow-up navigation.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(3);

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    /// Failure text shown to the user.
    Failed(String),
}

impl FlowState {
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// `Submitting` marker for one gateway call. Restores the previous state if
/// dropped before [`Pending::settle`].
pub(crate) struct Pending<'a> {
    state: &'a mut FlowState,
    previous: Option<FlowState>,
}

impl<'a> Pending<'a> {
    pub(crate) fn begin(state: &'a mut FlowState) -> Self {
        let previous = mem::replace(state, FlowState::Submitting);
        Self { state, previous: Some(previous) }
    }

    pub(crate) fn settle(mut self, next: FlowState) {
        self.previous = None;
        *self.state = next;
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.state = previous;
        }
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Dashboard => "/dashboard",
        }
    }
}

/// Front-end router capability.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("form is invalid: {0}")]
    Invalid(ErrorSet),

    #[error("token is missing from the link")]
    MissingToken,

    #[error("flow already completed")]
    AlreadyCompleted,

    /// `message` is the text placed in [`FlowState::Failed`].
    #[error("{message}")]
    Gateway {
        message: String,
        #[source]
        source: GatewayError,
    },
}

impl ErrorCode for FlowError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "E_FORM_INVALID",
            Self::MissingToken => "E_MISSING_TOKEN",
            Self::AlreadyCompleted => "E_ALREADY_COMPLETED",
            Self::Gateway { source, .. } => source.error_code(),
        }
    }
}

/// Server message verbatim when present, otherwise the screen's fallback.
pub(crate) fn failure_message(err: &GatewayError, fallback: &str) -> String {
    err.server_message().unwrap_or(fallback).to_owned()
}


#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
