//! Forgot-password screen: collect an email, ask the service to send a
//! reset link.

use std::sync::Arc;

use tracing::{info, warn};

use super::{FlowError, FlowState, Pending, failure_message};
use crate::auth::gateway::AuthGateway;
use crate::auth::validate::{EmailForm, FormState};
use crate::error::ErrorCode;

pub const SENT_MESSAGE: &str = "Password reset instructions have been sent to your email.";
pub const FALLBACK_MESSAGE: &str = "Failed to send reset email. Please try again.";

pub struct ForgotPasswordFlow {
    gateway: Arc<dyn AuthGateway>,
    form: FormState<EmailForm>,
    state: FlowState,
}

impl ForgotPasswordFlow {
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        Self { gateway, form: FormState::default(), state: FlowState::Idle }
    }

    #[must_use]
    pub fn form(&self) -> &FormState<EmailForm> {
        &self.form
    }

    pub fn set_email(&mut self, email: &str) {
        self.form.update(|f| email.clone_into(&mut f.email));
    }

    #[must_use]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Confirmation text once the email has been sent.
    #[must_use]
    pub fn success_message(&self) -> Option<&'static str> {
        self.state.is_succeeded().then_some(SENT_MESSAGE)
    }

    /// # Errors
    ///
    /// `Invalid` without contacting the service when the email fails
    /// validation, `AlreadyCompleted` after a successful send, `Gateway`
    /// when the service call fails (the state then holds the message).
    pub async fn submit(&mut self) -> Result<(), FlowError> {
        if self.state.is_succeeded() {
            return Err(FlowError::AlreadyCompleted);
        }
        self.form.mark_submitted();
        if self.form.is_invalid() {
            return Err(FlowError::Invalid(self.form.errors().clone()));
        }

        let pending = Pending::begin(&mut self.state);
        match self.gateway.request_password_reset(&self.form.fields().email).await {
            Ok(()) => {
                info!("forgot-password: reset email requested");
                pending.settle(FlowState::Succeeded);
                Ok(())
            }
            Err(source) => {
                warn!(error = %source, code = source.error_code(), "forgot-password: request failed");
                let message = failure_message(&source, FALLBACK_MESSAGE);
                pending.settle(FlowState::Failed(message.clone()));
                Err(FlowError::Gateway { message, source })
            }
        }
    }
}

#[cfg(test)]
#[path = "forgot_password_test.rs"]
mod tests;
