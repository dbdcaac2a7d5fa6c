//! Forgot-password page: request a reset code by email.

#[cfg(test)]
#[path = "forgot_password_test.rs"]
mod forgot_password_test;

use std::sync::{Arc, Mutex};

use super::{PageCore, PageStatus, SubmitOutcome, failure_message, lock};
use crate::auth::AuthClient;
use crate::config::ClientConfig;
use crate::guard::Navigator;
use crate::route::Route;
use crate::validate::{self, FieldErrors};

pub const SUCCESS_MESSAGE: &str = "Password reset code sent! Redirecting...";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to send reset email. Please try again.";
/// Shown in the "we'll email ..." hint until a valid address is typed.
pub const PLACEHOLDER_EMAIL: &str = "sampleemail@mail.com";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForgotPasswordView {
    pub email: String,
    pub status: PageStatus,
}

impl ForgotPasswordView {
    /// Address echoed in the page hint.
    #[must_use]
    pub fn email_preview(&self) -> String {
        validate::email(&self.email).map_or_else(|_| PLACEHOLDER_EMAIL.to_owned(), str::to_owned)
    }
}

#[derive(Clone)]
pub struct ForgotPasswordPage {
    auth: AuthClient,
    core: PageCore,
    view: Arc<Mutex<ForgotPasswordView>>,
}

impl ForgotPasswordPage {
    pub fn open(auth: AuthClient, navigator: Arc<dyn Navigator>, config: &ClientConfig) -> Self {
        Self {
            auth,
            core: PageCore::new(navigator, config.short_redirect_delay()),
            view: Arc::new(Mutex::new(ForgotPasswordView::default())),
        }
    }

    #[must_use]
    pub fn view(&self) -> ForgotPasswordView {
        lock(&self.view).clone()
    }

    pub fn set_email(&self, email: &str) {
        lock(&self.view).email = email.to_owned();
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (ticket, email) = {
            let mut view = lock(&self.view);
            if view.status.is_submitting() {
                return SubmitOutcome::Busy;
            }
            view.status.clear_messages();
            let email = match validate::email(&view.email) {
                Ok(email) => email.to_owned(),
                Err(e) => {
                    view.status.reject(FieldErrors::from([("email", e)]), None);
                    return SubmitOutcome::Invalid;
                }
            };
            (view.status.begin(), email)
        };

        let result = self.auth.forgot_password(&email).await;

        let mut view = lock(&self.view);
        if !view.status.is_current(ticket) {
            return SubmitOutcome::Stale;
        }
        match result {
            Ok(_) => {
                view.status.succeed(Some(SUCCESS_MESSAGE.to_owned()));
                drop(view);
                self.core
                    .navigate_after(Route::ResetPassword { email: Some(email) }, self.core.redirect_delay());
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                tracing::warn!(%email, error = %err, "forgot password failed");
                view.status.fail(failure_message(&err, DEFAULT_FAILURE_MESSAGE));
                SubmitOutcome::Failed
            }
        }
    }

    pub fn leave(&self) {
        lock(&self.view).status.invalidate();
        self.core.cancel_redirect();
    }

    pub async fn settle(&self) {
        self.core.settle().await;
    }
}
