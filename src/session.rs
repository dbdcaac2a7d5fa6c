//! Session store: the one process-wide record of who is signed in.
//!
//! SYSTEM CONTEXT
//! ==============
//! The auth client writes it, the route guard and page controllers read it.
//! Handles are cheap clones of one shared state, so every reader observes
//! the same value and there are no stale forks.
//!
//! DESIGN
//! ======
//! Push-based observers live in an explicit list. A new observer is replayed
//! the latest value immediately, then notified on every `set`, synchronously
//! and in registration order. `set` calls are serialized end to end so
//! notifications follow the order values were applied (last write wins).
//! Observers must not call `set` re-entrantly.
//!
//! ERROR HANDLING
//! ==============
//! Unreadable or malformed persisted data is logged and treated as "no
//! session"; persistence failures on write are logged. Nothing here returns
//! an error to callers.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StorageError;
use crate::model::User;
use crate::storage::{KeyValueStorage, MemoryStorage};

/// Storage key of the persisted session slot.
pub const SESSION_KEY: &str = "currentUser";

type Observer = Arc<dyn Fn(Option<&User>) + Send + Sync>;

/// Handle returned by `subscribe`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<dyn KeyValueStorage>,
    state: Mutex<State>,
    /// Held for the whole of `set`/`subscribe` so deliveries never interleave.
    publish: Mutex<()>,
}

struct State {
    user: Option<User>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl SessionStore {
    /// Open the store over `storage`, restoring any persisted user.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let user = read_persisted(storage.as_ref());
        tracing::debug!(authenticated = user.is_some(), "session restored");
        Self {
            inner: Arc::new(Inner {
                storage,
                state: Mutex::new(State { user, observers: Vec::new(), next_id: 0 }),
                publish: Mutex::new(()),
            }),
        }
    }

    /// Store backed by a fresh in-memory slot.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemoryStorage::new()))
    }

    /// Latest known user, if signed in.
    #[must_use]
    pub fn current(&self) -> Option<User> {
        self.lock_state().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock_state().user.is_some()
    }

    /// Register `observer`; it is called once now with the current value and
    /// again after every subsequent `set`.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(Option<&User>) + Send + Sync + 'static,
    {
        let _publish = self.inner.publish.lock().unwrap_or_else(PoisonError::into_inner);
        let observer: Observer = Arc::new(observer);
        let (id, snapshot) = {
            let mut state = self.lock_state();
            let id = SubscriptionId(state.next_id);
            state.next_id += 1;
            state.observers.push((id, Arc::clone(&observer)));
            (id, state.user.clone())
        };
        observer(snapshot.as_ref());
        id
    }

    /// Remove a previously registered observer. Returns `false` if unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.lock_state();
        let before = state.observers.len();
        state.observers.retain(|(existing, _)| *existing != id);
        state.observers.len() != before
    }

    /// Replace the session value, persist it (or clear the slot), and notify.
    pub fn set(&self, user: Option<User>) {
        let _publish = self.inner.publish.lock().unwrap_or_else(PoisonError::into_inner);
        let observers = {
            let mut state = self.lock_state();
            state.user.clone_from(&user);
            state.observers.iter().map(|(_, o)| Arc::clone(o)).collect::<Vec<_>>()
        };
        self.persist(user.as_ref());
        for observer in observers {
            observer(user.as_ref());
        }
    }

    /// Sign out: empty the session and the persisted slot.
    pub fn clear(&self) {
        self.set(None);
    }

    fn persist(&self, user: Option<&User>) {
        let storage = self.inner.storage.as_ref();
        let result = match user {
            Some(user) => serde_json::to_string(user)
                .map_err(StorageError::from)
                .and_then(|raw| storage.set(SESSION_KEY, &raw)),
            None => storage.remove(SESSION_KEY),
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to persist session");
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock_state();
        f.debug_struct("SessionStore")
            .field("user", &state.user)
            .field("observers", &state.observers.len())
            .finish_non_exhaustive()
    }
}

fn read_persisted(storage: &dyn KeyValueStorage) -> Option<User> {
    let raw = match storage.get(SESSION_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!(error = %e, "session slot unreadable; starting signed out");
            return None;
        }
    };
    match serde_json::from_str::<Option<User>>(&raw) {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "discarding malformed persisted session");
            if let Err(e) = storage.remove(SESSION_KEY) {
                tracing::warn!(error = %e, "failed to remove malformed session");
            }
            None
        }
    }
}
