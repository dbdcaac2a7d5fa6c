//! Reset-password page: emailed 6-digit code plus a new password.

#[cfg(test)]
#[path = "reset_password_test.rs"]
mod reset_password_test;

use std::sync::{Arc, Mutex};

use super::{PageCore, PageStatus, SubmitOutcome, failure_message, lock};
use crate::auth::AuthClient;
use crate::config::ClientConfig;
use crate::guard::Navigator;
use crate::route::Route;
use crate::validate::{self, FieldErrors, MIN_PASSWORD_LEN, check};

pub const INVALID_FORM_MESSAGE: &str = "Please fill in all fields correctly";
pub const SUCCESS_MESSAGE: &str = "Password reset successfully! Redirecting to login...";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to reset password. Please try again.";
pub const CODE_FIELD: &str = "resetCode";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResetPasswordView {
    pub email: String,
    pub reset_code: String,
    pub new_password: String,
    pub confirm_password: String,
    pub status: PageStatus,
}

#[derive(Clone)]
pub struct ResetPasswordPage {
    auth: AuthClient,
    core: PageCore,
    view: Arc<Mutex<ResetPasswordView>>,
}

impl ResetPasswordPage {
    /// Open for `route`. Without an email to reset there is nothing to do
    /// here, so the page bounces to forgot-password.
    pub fn open(auth: AuthClient, navigator: Arc<dyn Navigator>, config: &ClientConfig, route: &Route) -> Self {
        let email = match route {
            Route::ResetPassword { email: Some(email) } => email.clone(),
            _ => String::new(),
        };
        let mut status = PageStatus::default();
        status.focus = Some(CODE_FIELD);
        let page = Self {
            auth,
            core: PageCore::new(navigator, config.redirect_delay),
            view: Arc::new(Mutex::new(ResetPasswordView { email, status, ..ResetPasswordView::default() })),
        };
        if lock(&page.view).email.is_empty() {
            page.core.navigate(Route::ForgotPassword);
        }
        page
    }

    #[must_use]
    pub fn view(&self) -> ResetPasswordView {
        lock(&self.view).clone()
    }

    /// Typed code input; non-digits are dropped and length capped.
    pub fn set_reset_code(&self, raw: &str) {
        lock(&self.view).reset_code = validate::sanitize_code_input(raw);
    }

    pub fn set_new_password(&self, value: &str) {
        lock(&self.view).new_password = value.to_owned();
    }

    pub fn set_confirm_password(&self, value: &str) {
        lock(&self.view).confirm_password = value.to_owned();
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (ticket, email, code, new_password) = {
            let mut view = lock(&self.view);
            if view.status.is_submitting() {
                return SubmitOutcome::Busy;
            }
            view.status.clear_messages();
            let errors = collect_errors(&view);
            if !errors.is_empty() || view.email.is_empty() {
                view.status.reject(errors, Some(INVALID_FORM_MESSAGE));
                return SubmitOutcome::Invalid;
            }
            let ticket = view.status.begin();
            (ticket, view.email.clone(), view.reset_code.clone(), view.new_password.clone())
        };

        let result = self.auth.reset_password(&email, &code, &new_password).await;

        let mut view = lock(&self.view);
        if !view.status.is_current(ticket) {
            return SubmitOutcome::Stale;
        }
        match result {
            Ok(_) => {
                view.status.succeed(Some(SUCCESS_MESSAGE.to_owned()));
                drop(view);
                self.core.navigate_after(Route::login(), self.core.redirect_delay());
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                tracing::warn!(%email, error = %err, "password reset failed");
                view.status.fail(failure_message(&err, DEFAULT_FAILURE_MESSAGE));
                view.reset_code.clear();
                view.status.focus = Some(CODE_FIELD);
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

fn collect_errors(view: &ResetPasswordView) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check(&mut errors, CODE_FIELD, validate::code(&view.reset_code));
    check(&mut errors, "newPassword", validate::password(&view.new_password, MIN_PASSWORD_LEN));
    if let Err(e) = validate::confirmation(&view.new_password, &view.confirm_password) {
        errors.insert("confirmPassword", e);
    }
    errors
}
