//! Account operations against `/users/*`.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each method issues exactly one request and resolves once. Only `login`
//! and `update_profile` write the session store, and only on success; every
//! other operation leaves it untouched.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::error::ApiError;
use crate::http::ApiHttp;
use crate::model::{Ack, EmailRequest, LoginRequest, LoginResponse, ResetPasswordRequest, User, VerifyRequest};
use crate::session::SessionStore;

#[derive(Clone, Debug)]
pub struct AuthClient {
    http: ApiHttp,
    session: SessionStore,
}

impl AuthClient {
    #[must_use]
    pub fn new(http: ApiHttp, session: SessionStore) -> Self {
        Self { http, session }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Create an account (`POST /users/register`).
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` on any failure.
    pub async fn register(&self, user: &User) -> Result<Ack, ApiError> {
        tracing::info!(email = %user.email, "registering user");
        let ack: Ack = self.http.post_json("/users/register", user).await?;
        tracing::info!(email = %user.email, "registration accepted");
        Ok(ack)
    }

    /// Sign in (`POST /users/login`) and publish the returned user.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` on any failure, including a success
    /// response with no `user` payload. The session is untouched on error.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        tracing::info!(%email, "attempting login");
        let response: LoginResponse = self
            .http
            .post_json("/users/login", &LoginRequest { email, password })
            .await?;
        let Some(user) = response.user else {
            tracing::warn!(%email, "login response missing user");
            return Err(ApiError::invalid_response(Some(200)));
        };
        let user = user.without_credentials();
        self.session.set(Some(user.clone()));
        tracing::info!(%email, "login succeeded");
        Ok(user)
    }

    /// Sign out locally; no request is made.
    pub fn logout(&self) {
        tracing::info!("logging out");
        self.session.clear();
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.current()
    }

    /// Replace profile fields (`PUT /users/{id}`) and publish the result.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` on any failure.
    pub async fn update_profile(&self, user_id: i64, user: &User) -> Result<User, ApiError> {
        let updated: User = self.http.put_json(&format!("/users/{user_id}"), user).await?;
        let updated = updated.without_credentials();
        self.session.set(Some(updated.clone()));
        tracing::info!(user_id, "profile updated");
        Ok(updated)
    }

    /// Confirm an email address with its 6-digit code (`POST /users/verify`).
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` on any failure.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<Ack, ApiError> {
        tracing::info!(%email, "verifying email");
        self.http.post_json("/users/verify", &VerifyRequest { email, code }).await
    }

    /// Ask for a fresh verification code (`POST /users/resend-verification`).
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` on any failure.
    pub async fn resend_verification_code(&self, email: &str) -> Result<Ack, ApiError> {
        tracing::info!(%email, "resending verification code");
        self.http
            .post_json("/users/resend-verification", &EmailRequest { email })
            .await
    }

    /// Start a password reset (`POST /users/forgot-password`).
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` on any failure.
    pub async fn forgot_password(&self, email: &str) -> Result<Ack, ApiError> {
        tracing::info!(%email, "requesting password reset");
        self.http
            .post_json("/users/forgot-password", &EmailRequest { email })
            .await
    }

    /// Finish a password reset with the emailed code (`POST /users/reset-password`).
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` on any failure.
    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<Ack, ApiError> {
        tracing::info!(%email, "resetting password");
        self.http
            .post_json("/users/reset-password", &ResetPasswordRequest { email, token: code, new_password })
            .await
    }
}
