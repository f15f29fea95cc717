//! Reset-password screen: new password from an emailed link, then back to
//! the login page.

use std::sync::Arc;

use tracing::{info, warn};

use super::{FlowError, FlowState, Navigator, Pending, REDIRECT_DELAY, RedirectTimer, Route, failure_message};
use crate::auth::gateway::AuthGateway;
use crate::auth::token::ResetToken;
use crate::auth::validate::{FormState, ResetPasswordForm};
use crate::error::ErrorCode;

pub const MISSING_TOKEN_MESSAGE: &str = "Reset token is missing. Please use the link from your email.";
pub const FALLBACK_MESSAGE: &str = "Failed to reset password. Please try again.";

pub struct ResetPasswordFlow {
    gateway: Arc<dyn AuthGateway>,
    navigator: Arc<dyn Navigator>,
    token: Option<ResetToken>,
    form: FormState<ResetPasswordForm>,
    state: FlowState,
    redirect: RedirectTimer,
}

impl ResetPasswordFlow {
    /// A flow without a token starts out failed and never calls the service.
    #[must_use]
    pub fn new(token: Option<ResetToken>, gateway: Arc<dyn AuthGateway>, navigator: Arc<dyn Navigator>) -> Self {
        let state = if token.is_some() {
            FlowState::Idle
        } else {
            warn!("reset-password: opened without a token");
            FlowState::Failed(MISSING_TOKEN_MESSAGE.to_owned())
        };
        Self {
            gateway,
            navigator,
            token,
            form: FormState::default(),
            state,
            redirect: RedirectTimer::new(),
        }
    }

    /// Build from the location the user landed on, e.g.
    /// `/auth/reset-password?token=...`.
    #[must_use]
    pub fn from_location(location: &str, gateway: Arc<dyn AuthGateway>, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(ResetToken::from_location(location), gateway, navigator)
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn form(&self) -> &FormState<ResetPasswordForm> {
        &self.form
    }

    pub fn set_password(&mut self, password: &str) {
        self.form.update(|f| password.clone_into(&mut f.password));
    }

    pub fn set_confirm_password(&mut self, confirm: &str) {
        self.form.update(|f| confirm.clone_into(&mut f.confirm_password));
    }

    #[must_use]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    #[must_use]
    pub fn redirect_pending(&self) -> bool {
        self.redirect.is_pending()
    }

    /// On success, navigates to [`Route::Login`] after [`REDIRECT_DELAY`].
    ///
    /// # Errors
    ///
    /// `MissingToken` when the link had no token, `AlreadyCompleted` after
    /// success, `Invalid` when the form fails validation, `Gateway` when
    /// the service rejects the reset.
    pub async fn submit(&mut self) -> Result<(), FlowError> {
        let Some(token) = &self.token else {
            return Err(FlowError::MissingToken);
        };
        if self.state.is_succeeded() {
            return Err(FlowError::AlreadyCompleted);
        }
        self.form.mark_submitted();
        if self.form.is_invalid() {
            return Err(FlowError::Invalid(self.form.errors().clone()));
        }

        let pending = Pending::begin(&mut self.state);
        match self
            .gateway
            .confirm_password_reset(token, &self.form.fields().password)
            .await
        {
            Ok(()) => {
                info!("reset-password: password updated");
                pending.settle(FlowState::Succeeded);
                self.redirect
                    .schedule(Arc::clone(&self.navigator), Route::Login, REDIRECT_DELAY);
                Ok(())
            }
            Err(source) => {
                warn!(error = %source, code = source.error_code(), "reset-password: request failed");
                let message = failure_message(&source, FALLBACK_MESSAGE);
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
#[path = "reset_password_test.rs"]
mod tests;
