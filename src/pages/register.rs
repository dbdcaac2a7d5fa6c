//! Registration page.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use std::sync::{Arc, Mutex};

use super::{PageCore, PageStatus, SubmitOutcome, failure_message, lock};
use crate::auth::AuthClient;
use crate::config::ClientConfig;
use crate::guard::Navigator;
use crate::model::User;
use crate::route::Route;
use crate::validate::{self, FieldErrors, MIN_PASSWORD_LEN, check};

pub const SUCCESS_MESSAGE: &str = "Registration successful! Check your email for verification code.";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Registration failed. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterView {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub notification_preferences: bool,
    pub status: PageStatus,
}

impl Default for RegisterView {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            notification_preferences: true,
            status: PageStatus::default(),
        }
    }
}

#[derive(Clone)]
pub struct RegisterPage {
    auth: AuthClient,
    core: PageCore,
    view: Arc<Mutex<RegisterView>>,
}

impl RegisterPage {
    pub fn open(auth: AuthClient, navigator: Arc<dyn Navigator>, config: &ClientConfig) -> Self {
        Self {
            auth,
            core: PageCore::new(navigator, config.redirect_delay),
            view: Arc::new(Mutex::new(RegisterView::default())),
        }
    }

    #[must_use]
    pub fn view(&self) -> RegisterView {
        lock(&self.view).clone()
    }

    pub fn set_first_name(&self, value: &str) {
        lock(&self.view).first_name = value.to_owned();
    }

    pub fn set_last_name(&self, value: &str) {
        lock(&self.view).last_name = value.to_owned();
    }

    pub fn set_email(&self, value: &str) {
        lock(&self.view).email = value.to_owned();
    }

    pub fn set_password(&self, value: &str) {
        lock(&self.view).password = value.to_owned();
    }

    pub fn set_confirm_password(&self, value: &str) {
        lock(&self.view).confirm_password = value.to_owned();
    }

    pub fn set_notification_preferences(&self, enabled: bool) {
        lock(&self.view).notification_preferences = enabled;
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (ticket, user) = {
            let mut view = lock(&self.view);
            if view.status.is_submitting() {
                return SubmitOutcome::Busy;
            }
            view.status.clear_messages();
            let Some(user) = build_user(&view) else {
                let errors = collect_errors(&view);
                view.status.reject(errors, None);
                return SubmitOutcome::Invalid;
            };
            (view.status.begin(), user)
        };

        let result = self.auth.register(&user).await;

        let mut view = lock(&self.view);
        if !view.status.is_current(ticket) {
            return SubmitOutcome::Stale;
        }
        match result {
            Ok(ack) => {
                view.status.succeed(Some(ack.message().unwrap_or(SUCCESS_MESSAGE).to_owned()));
                drop(view);
                self.core
                    .navigate_after(Route::Verify { email: Some(user.email) }, self.core.redirect_delay());
                SubmitOutcome::Succeeded
            }
            Err(err) => {
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

fn collect_errors(view: &RegisterView) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check(&mut errors, "firstName", validate::required(&view.first_name));
    check(&mut errors, "lastName", validate::required(&view.last_name));
    check(&mut errors, "email", validate::email(&view.email));
    check(&mut errors, "password", validate::password(&view.password, MIN_PASSWORD_LEN));
    if let Err(e) = validate::confirmation(&view.password, &view.confirm_password) {
        errors.insert("confirmPassword", e);
    }
    errors
}

fn build_user(view: &RegisterView) -> Option<User> {
    if !collect_errors(view).is_empty() {
        return None;
    }
    Some(User::new_account(
        view.email.trim(),
        &view.password,
        view.first_name.trim(),
        view.last_name.trim(),
        view.notification_preferences,
    ))
}
