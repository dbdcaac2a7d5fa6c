//! Email verification page: 6-digit code entry plus code resend.

#[cfg(test)]
#[path = "verify_email_test.rs"]
mod verify_email_test;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{PageCore, PageStatus, SubmitOutcome, Ticket, failure_message, lock};
use crate::auth::AuthClient;
use crate::config::ClientConfig;
use crate::guard::Navigator;
use crate::route::Route;
use crate::validate::{self, FieldErrors};

pub const INVALID_CODE_MESSAGE: &str = "Please enter a valid 6-digit verification code";
pub const MISSING_EMAIL_MESSAGE: &str = "No email address to verify. Please sign in again.";
pub const SUCCESS_MESSAGE: &str = "Email verified successfully! Redirecting to login...";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Invalid verification code. Please try again.";
pub const RESEND_SUCCESS_MESSAGE: &str = "Verification code resent! Check your email.";
pub const RESEND_FAILURE_MESSAGE: &str = "Failed to resend code. Please try again.";
pub const CODE_FIELD: &str = "verificationCode";
/// How long the resend confirmation stays visible.
pub const RESEND_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerifyEmailView {
    pub email: Option<String>,
    pub verification_code: String,
    pub status: PageStatus,
}

impl VerifyEmailView {
    /// Address shown in the page copy.
    #[must_use]
    pub fn display_email(&self) -> &str {
        self.email.as_deref().unwrap_or("your email")
    }
}

#[derive(Clone)]
pub struct VerifyEmailPage {
    auth: AuthClient,
    core: PageCore,
    view: Arc<Mutex<VerifyEmailView>>,
    notice_ttl: Duration,
}

impl VerifyEmailPage {
    pub fn open(auth: AuthClient, navigator: Arc<dyn Navigator>, config: &ClientConfig, route: &Route) -> Self {
        let email = match route {
            Route::Verify { email } => email.clone(),
            _ => None,
        };
        let mut status = PageStatus::default();
        status.focus = Some(CODE_FIELD);
        Self {
            auth,
            core: PageCore::new(navigator, config.redirect_delay),
            view: Arc::new(Mutex::new(VerifyEmailView { email, status, ..VerifyEmailView::default() })),
            notice_ttl: RESEND_NOTICE_TTL,
        }
    }

    #[must_use]
    pub fn view(&self) -> VerifyEmailView {
        lock(&self.view).clone()
    }

    /// Typed code input; non-digits are dropped and length capped.
    pub fn set_verification_code(&self, raw: &str) {
        lock(&self.view).verification_code = validate::sanitize_code_input(raw);
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (ticket, email, code) = {
            let mut view = lock(&self.view);
            if view.status.is_submitting() {
                return SubmitOutcome::Busy;
            }
            view.status.clear_messages();
            if let Err(e) = validate::code(&view.verification_code) {
                view.status.reject(FieldErrors::from([(CODE_FIELD, e)]), Some(INVALID_CODE_MESSAGE));
                return SubmitOutcome::Invalid;
            }
            let Some(email) = view.email.clone() else {
                view.status.reject(FieldErrors::new(), Some(MISSING_EMAIL_MESSAGE));
                return SubmitOutcome::Invalid;
            };
            let ticket = view.status.begin();
            (ticket, email, view.verification_code.clone())
        };

        let result = self.auth.verify_email(&email, &code).await;

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
                tracing::warn!(%email, error = %err, "email verification failed");
                view.status.fail(failure_message(&err, DEFAULT_FAILURE_MESSAGE));
                view.verification_code.clear();
                view.status.focus = Some(CODE_FIELD);
                SubmitOutcome::Failed
            }
        }
    }

    /// Ask the backend to email a new code.
    pub async fn resend_code(&self) -> SubmitOutcome {
        let (ticket, email) = {
            let mut view = lock(&self.view);
            if view.status.is_submitting() {
                return SubmitOutcome::Busy;
            }
            view.status.clear_messages();
            let Some(email) = view.email.clone() else {
                view.status.reject(FieldErrors::new(), Some(MISSING_EMAIL_MESSAGE));
                return SubmitOutcome::Invalid;
            };
            (view.status.begin(), email)
        };

        let result = self.auth.resend_verification_code(&email).await;

        let mut view = lock(&self.view);
        if !view.status.is_current(ticket) {
            return SubmitOutcome::Stale;
        }
        match result {
            Ok(_) => {
                view.status.succeed(Some(RESEND_SUCCESS_MESSAGE.to_owned()));
                view.verification_code.clear();
                view.status.focus = Some(CODE_FIELD);
                drop(view);
                self.expire_notice(ticket);
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                tracing::warn!(%email, error = %err, "resend verification failed");
                view.status.fail(RESEND_FAILURE_MESSAGE.to_owned());
                SubmitOutcome::Failed
            }
        }
    }

    /// Hide the resend confirmation after a while unless something newer
    /// has happened on the page since.
    fn expire_notice(&self, ticket: Ticket) {
        let view = Arc::clone(&self.view);
        let ttl = self.notice_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut view = lock(&view);
            if view.status.is_current(ticket) && view.status.success.as_deref() == Some(RESEND_SUCCESS_MESSAGE) {
                view.status.success = None;
            }
        });
    }

    pub fn leave(&self) {
        lock(&self.view).status.invalidate();
        self.core.cancel_redirect();
    }

    pub async fn settle(&self) {
        self.core.settle().await;
    }
}
