//! Wire DTOs shared with the TrainTrack backend.
//!
//! DESIGN
//! ======
//! Field names follow the backend's camelCase JSON so serde round-trips are
//! lossless. Payloads the client never interprets (predictions, acks) stay
//! as opaque JSON wrappers and are handed to callers untouched.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account plan as stored by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
    Enterprise,
}

/// Identity record; the client holds a read-mostly cached copy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend-assigned identifier, absent before registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub email: String,
    /// On registration this carries the chosen plaintext password; the
    /// backend hashes it on receipt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// Plain password field; the backend never reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_tier: Option<SubscriptionTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_preferences: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// ISO-8601 creation timestamp exactly as the backend sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl User {
    /// Registration payload for a new free-tier account.
    #[must_use]
    pub fn new_account(email: &str, password: &str, first_name: &str, last_name: &str, notifications: bool) -> Self {
        Self {
            email: email.to_owned(),
            password_hash: Some(password.to_owned()),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            subscription_tier: Some(SubscriptionTier::Free),
            notification_preferences: Some(notifications),
            ..Self::default()
        }
    }

    /// Copy with password material removed, suitable for the session slot.
    #[must_use]
    pub fn without_credentials(mut self) -> Self {
        self.password = None;
        self.password_hash = None;
        self
    }

    /// "First Last", falling back to the email when both names are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() { self.email.clone() } else { full.to_owned() }
    }
}

/// Station summary from `GET /stations`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: u64,
    pub name: String,
    /// Any additional columns the backend includes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Prediction payload from `GET /predict`; passed to the view unmodified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prediction(pub Value);

impl Prediction {
    /// `congestionLevel` field, when the backend supplied one as a string.
    #[must_use]
    pub fn congestion_level(&self) -> Option<&str> {
        self.0.get("congestionLevel").and_then(Value::as_str)
    }
}

/// Acknowledgement body from the account endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ack(pub Value);

impl Ack {
    /// `message` field, when present.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }
}

// =============================================================================
// REQUEST / RESPONSE BODIES
// =============================================================================

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Serialize)]
pub(crate) struct VerifyRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

#[derive(Serialize)]
pub(crate) struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub token: &'a str,
    pub new_password: &'a str,
}
