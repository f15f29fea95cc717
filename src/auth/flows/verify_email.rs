//! Verify-email screen: confirm the address from an emailed link, sign the
//! user in if the service issues a session, then go to the dashboard.
//!
//! A separate resend action lets the user request a fresh link; it has its
//! own form and state and never touches the verification state.

use std::sync::Arc;

use tracing::{info, warn};

use super::{FlowError, FlowState, Navigator, Pending, REDIRECT_DELAY, RedirectTimer, Route, failure_message};
use crate::auth::gateway::AuthGateway;
use crate::auth::session::SessionStore;
use crate::auth::token::ResetToken;
use crate::auth::validate::{EmailForm, FormState};
use crate::error::ErrorCode;

pub const MISSING_TOKEN_MESSAGE: &str = "Verification token is missing. Please use the link from your email.";
pub const FALLBACK_MESSAGE: &str = "Failed to verify email. Please try again.";
pub const RESENT_MESSAGE: &str = "A new verification link has been sent to your email.";
pub const RESEND_FALLBACK_MESSAGE: &str = "Failed to resend verification email. Please try again.";

pub struct VerifyEmailFlow {
    gateway: Arc<dyn AuthGateway>,
    navigator: Arc<dyn Navigator>,
    sessions: Arc<SessionStore>,
    token: Option<ResetToken>,
    state: FlowState,
    redirect: RedirectTimer,
    resend_form: FormState<EmailForm>,
    resend_state: FlowState,
}

impl VerifyEmailFlow {
    #[must_use]
    pub fn new(
        token: Option<ResetToken>,
        gateway: Arc<dyn AuthGateway>,
        navigator: Arc<dyn Navigator>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            gateway,
            navigator,
            sessions,
            token,
            state: FlowState::Idle,
            redirect: RedirectTimer::new(),
            resend_form: FormState::default(),
            resend_state: FlowState::Idle,
        }
    }

    #[must_use]
    pub fn from_location(
        location: &str,
        gateway: Arc<dyn AuthGateway>,
        navigator: Arc<dyn Navigator>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self::new(ResetToken::from_location(location), gateway, navigator, sessions)
    }

    #[must_use]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    #[must_use]
    pub fn redirect_pending(&self) -> bool {
        self.redirect.is_pending()
    }

    /// Run verification as soon as the screen opens. Without a token the
    /// flow fails with [`MISSING_TOKEN_MESSAGE`] and the service is not
    /// called. On success, navigates to [`Route::Dashboard`] after
    /// [`REDIRECT_DELAY`].
    ///
    /// # Errors
    ///
    /// `MissingToken`, `AlreadyCompleted` after success, or `Gateway` when
    /// the service rejects the token.
    pub async fn start(&mut self) -> Result<(), FlowError> {
        let Some(token) = &self.token else {
            warn!("verify-email: opened without a token");
            self.state = FlowState::Failed(MISSING_TOKEN_MESSAGE.to_owned());
            return Err(FlowError::MissingToken);
        };
        if self.state.is_succeeded() {
            return Err(FlowError::AlreadyCompleted);
        }

        let pending = Pending::begin(&mut self.state);
        match self.gateway.verify_email(token).await {
            Ok(session) => {
                match session {
                    Some(session) => self.sessions.sign_in(session),
                    None => info!("verify-email: verified without a session"),
                }
                pending.settle(FlowState::Succeeded);
                self.redirect
                    .schedule(Arc::clone(&self.navigator), Route::Dashboard, REDIRECT_DELAY);
                Ok(())
            }
            Err(source) => {
                warn!(error = %source, code = source.error_code(), "verify-email: request failed");
                let message = failure_message(&source, FALLBACK_MESSAGE);
                pending.settle(FlowState::Failed(message.clone()));
                Err(FlowError::Gateway { message, source })
            }
        }
    }

    // =========================================================================
    // RESEND
    // =========================================================================

    #[must_use]
    pub fn resend_form(&self) -> &FormState<EmailForm> {
        &self.resend_form
    }

    #[must_use]
    pub fn resend_state(&self) -> &FlowState {
        &self.resend_state
    }

    #[must_use]
    pub fn resend_message(&self) -> Option<&'static str> {
        self.resend_state.is_succeeded().then_some(RESENT_MESSAGE)
    }

    /// Request a fresh verification link for `email`. May be repeated.
    ///
    /// # Errors
    ///
    /// `Invalid` when the email fails validation, `Gateway` when the
    /// service call fails.
    pub async fn resend_verification(&mut self, email: &str) -> Result<(), FlowError> {
        self.resend_form.update(|f| email.clone_into(&mut f.email));
        self.resend_form.mark_submitted();
        if self.resend_form.is_invalid() {
            return Err(FlowError::Invalid(self.resend_form.errors().clone()));
        }

        let pending = Pending::begin(&mut self.resend_state);
        match self
            .gateway
            .resend_verification(&self.resend_form.fields().email)
            .await
        {
            Ok(()) => {
                info!("verify-email: verification link resent");
                pending.settle(FlowState::Succeeded);
                Ok(())
            }
            Err(source) => {
                warn!(error = %source, code = source.error_code(), "verify-email: resend failed");
                let message = failure_message(&source, RESEND_FALLBACK_MESSAGE);
                pending.settle(FlowState::Failed(message.clone()));
                Err(FlowError::Gateway { message, source })
            }
        }
    }

    /// Cancel the pending redirect, if any.
    pub fn teardown(&mut self) {
        self.redirect.cancel();
    }
}

#[cfg(test)]
#[path = "verify_email_test.rs"]
mod tests;
