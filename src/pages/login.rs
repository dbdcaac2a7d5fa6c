//! Login page supporting email + password sign-in.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use std::sync::{Arc, Mutex};

use super::{PageCore, PageStatus, SubmitOutcome, failure_message, lock};
use crate::auth::AuthClient;
use crate::config::ClientConfig;
use crate::guard::Navigator;
use crate::route::Route;
use crate::validate::{self, FieldErrors, check};

pub const UNVERIFIED_MESSAGE: &str = "Please verify your email before logging in.";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Invalid email or password";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    /// Where to go after signing in; `/` unless the guard sent us here.
    pub return_url: String,
    pub status: PageStatus,
}

#[derive(Clone)]
pub struct LoginPage {
    auth: AuthClient,
    core: PageCore,
    view: Arc<Mutex<LoginView>>,
}

impl LoginPage {
    /// Open the page for `route`. An already signed-in user is sent home.
    pub fn open(auth: AuthClient, navigator: Arc<dyn Navigator>, config: &ClientConfig, route: &Route) -> Self {
        let return_url = match route {
            Route::Login { return_url: Some(url) } => url.clone(),
            _ => Route::Home.to_url(),
        };
        let page = Self {
            auth,
            core: PageCore::new(navigator, config.redirect_delay),
            view: Arc::new(Mutex::new(LoginView { return_url, ..LoginView::default() })),
        };
        if page.auth.is_authenticated() {
            page.core.navigate(Route::Home);
        }
        page
    }

    #[must_use]
    pub fn view(&self) -> LoginView {
        lock(&self.view).clone()
    }

    pub fn set_email(&self, email: &str) {
        lock(&self.view).email = email.to_owned();
    }

    pub fn set_password(&self, password: &str) {
        lock(&self.view).password = password.to_owned();
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (ticket, email, password) = {
            let mut view = lock(&self.view);
            if view.status.is_submitting() {
                return SubmitOutcome::Busy;
            }
            view.status.clear_messages();
            let mut errors = FieldErrors::new();
            let email = check(&mut errors, "email", validate::email(&view.email)).map(str::to_owned);
            let password = check(&mut errors, "password", validate::required(&view.password)).map(|_| view.password.clone());
            let (Some(email), Some(password)) = (email, password) else {
                view.status.reject(errors, None);
                return SubmitOutcome::Invalid;
            };
            (view.status.begin(), email, password)
        };

        let result = self.auth.login(&email, &password).await;

        let mut view = lock(&self.view);
        if !view.status.is_current(ticket) {
            tracing::debug!(%email, "dropping stale login result");
            return SubmitOutcome::Stale;
        }
        match result {
            Ok(_) => {
                view.status.succeed(None);
                let target = Route::parse(&view.return_url);
                drop(view);
                self.core.navigate(target);
                SubmitOutcome::Succeeded
            }
            Err(err) if err.email_not_verified => {
                view.status.fail(UNVERIFIED_MESSAGE.to_owned());
                drop(view);
                let email = err.email.clone().unwrap_or(email);
                self.core.navigate_after(Route::Verify { email: Some(email) }, self.core.redirect_delay());
                SubmitOutcome::Failed
            }
            Err(err) => {
                tracing::warn!(%email, error = %err, "login failed");
                view.status.fail(failure_message(&err, DEFAULT_FAILURE_MESSAGE));
                SubmitOutcome::Failed
            }
        }
    }

    /// The user navigated away: drop in-flight results and pending redirects.
    pub fn leave(&self) {
        lock(&self.view).status.invalidate();
        self.core.cancel_redirect();
    }

    /// Wait for a scheduled redirect, if any, to fire.
    pub async fn settle(&self) {
        self.core.settle().await;
    }
}
