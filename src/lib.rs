//! TrainTrack client SDK.
//!
//! SYSTEM CONTEXT
//! ==============
//! Client side of the TrainTrack service: account flows (register, login,
//! email verification, password reset), a persisted session, route gating
//! for views that need a signed-in user, and the station/prediction lookup.
//! The backend lives elsewhere; everything here talks to it over REST.
//!
//! LAYERING
//! ========
//! `storage` → `session` → `http` → `auth`/`prediction` → `guard` → `pages`.
//! The session store is an explicitly owned handle passed to whichever
//! component needs it; nothing reaches for ambient globals.

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod model;
pub mod pages;
pub mod prediction;
pub mod route;
pub mod session;
pub mod storage;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::AuthClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiErrorKind, StorageError};
pub use guard::{GuardDecision, History, Navigator, RouteGuard};
pub use model::{Ack, Prediction, Station, SubscriptionTier, User};
pub use prediction::PredictionClient;
pub use route::Route;
pub use session::SessionStore;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
