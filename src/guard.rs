//! Route gating for views that need a signed-in user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation to a protected route consults the session store's last
//! known value. The decision is synchronous and does no I/O; a denied
//! navigation lands on `/login` carrying the original destination so the
//! login page can send the user back after signing in.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::sync::{Arc, Mutex, PoisonError};

use crate::route::Route;
use crate::session::SessionStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Denied; navigate here instead.
    Redirect(Route),
}

#[derive(Clone, Debug)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Decide whether `destination` may be shown right now.
    #[must_use]
    pub fn check(&self, destination: &Route) -> GuardDecision {
        if !destination.requires_auth() || self.session.is_authenticated() {
            return GuardDecision::Allow;
        }
        tracing::debug!(destination = %destination, "guard redirecting to login");
        GuardDecision::Redirect(Route::Login { return_url: Some(destination.to_url()) })
    }
}

/// Something pages can ask to show another view.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigation history that runs every request through the guard.
#[derive(Clone, Debug)]
pub struct History {
    guard: RouteGuard,
    entries: Arc<Mutex<Vec<Route>>>,
}

impl History {
    #[must_use]
    pub fn new(guard: RouteGuard) -> Self {
        Self { guard, entries: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Route currently shown, if any navigation has happened.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.lock().last().cloned()
    }

    /// All routes shown so far, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<Route> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Route>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route) {
        let landed = match self.guard.check(&route) {
            GuardDecision::Allow => route,
            GuardDecision::Redirect(to) => to,
        };
        tracing::debug!(route = %landed, "navigate");
        self.lock().push(landed);
    }
}
