//! Page controllers: form state, submission lifecycle, and navigation.
//!
//! ARCHITECTURE
//! ============
//! Each page is a cloneable handle over `Arc<Mutex<View>>`. A submit locks
//! the view, validates, moves `Idle/Failed → Submitting`, releases the lock
//! across the network await, then re-locks to apply the result. The view
//! lock is never held across an await.
//!
//! STALE RESULTS
//! =============
//! Every accepted submission takes a ticket from a per-page generation
//! counter. `leave()` bumps the counter and aborts any pending redirect, so
//! a response that arrives after the user moved on is dropped without
//! touching view state.

pub mod forgot_password;
pub mod login;
pub mod prediction;
pub mod register;
pub mod reset_password;
pub mod verify_email;


use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::guard::Navigator;
use crate::route::Route;
use crate::validate::FieldErrors;

pub use forgot_password::ForgotPasswordPage;
pub use login::LoginPage;
pub use prediction::PredictionPage;
pub use register::RegisterPage;
pub use reset_password::ResetPasswordPage;
pub use verify_email::VerifyEmailPage;

/// Lifecycle of a page's form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// What a submit call ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission was already in flight; nothing was sent.
    Busy,
    /// Local validation failed; nothing was sent.
    Invalid,
    Succeeded,
    Failed,
    /// The page was left (or resubmitted) before the response arrived.
    Stale,
}

/// Identifies one accepted submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// View state shared by every page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageStatus {
    pub state: ViewState,
    pub error: Option<String>,
    pub success: Option<String>,
    /// Inline errors from the last rejected submit.
    pub field_errors: FieldErrors,
    /// Form control that should hold input focus.
    pub focus: Option<&'static str>,
    generation: u64,
}

impl PageStatus {
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.state == ViewState::Submitting
    }

    /// Clear messages at the start of a submit attempt.
    pub(crate) fn clear_messages(&mut self) {
        self.error = None;
        self.success = None;
        self.field_errors.clear();
    }

    /// Local validation failed: stay (or return to) idle with inline errors.
    pub(crate) fn reject(&mut self, field_errors: FieldErrors, message: Option<&str>) {
        self.state = ViewState::Idle;
        self.field_errors = field_errors;
        self.error = message.map(str::to_owned);
    }

    pub(crate) fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.state = ViewState::Submitting;
        Ticket(self.generation)
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        self.generation == ticket.0
    }

    pub(crate) fn succeed(&mut self, message: Option<String>) {
        self.state = ViewState::Succeeded;
        self.success = message;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.state = ViewState::Failed;
        self.error = Some(message);
    }

    /// Forget in-flight work; late results will be dropped.
    pub(crate) fn invalidate(&mut self) {
        self.generation += 1;
        if self.state == ViewState::Submitting {
            self.state = ViewState::Idle;
        }
    }
}

pub(crate) fn lock<V>(view: &Mutex<V>) -> MutexGuard<'_, V> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Message for a failed call: the normalized message, or the page default
/// when a 4xx came back without a message of its own.
pub(crate) fn failure_message(err: &crate::error::ApiError, fallback: &str) -> String {
    if err.message.trim().is_empty() || err.is_bodiless_rejection() {
        fallback.to_owned()
    } else {
        err.message.clone()
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// Navigation plumbing shared by every page.
#[derive(Clone)]
pub(crate) struct PageCore {
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PageCore {
    pub(crate) fn new(navigator: Arc<dyn Navigator>, redirect_delay: Duration) -> Self {
        Self { navigator, redirect_delay, pending: Arc::new(Mutex::new(None)) }
    }

    pub(crate) fn redirect_delay(&self) -> Duration {
        self.redirect_delay
    }

    pub(crate) fn navigate(&self, route: Route) {
        self.navigator.navigate(route);
    }

    /// Navigate to `route` after `delay`, replacing any pending redirect.
    pub(crate) fn navigate_after(&self, route: Route, delay: Duration) {
        let navigator = Arc::clone(&self.navigator);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(route);
        });
        if let Some(previous) = lock(&self.pending).replace(handle) {
            previous.abort();
        }
    }

    pub(crate) fn cancel_redirect(&self) {
        if let Some(handle) = lock(&self.pending).take() {
            handle.abort();
        }
    }

    /// Wait for a scheduled redirect, if any, to fire.
    pub(crate) async fn settle(&self) {
        let handle = lock(&self.pending).take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
