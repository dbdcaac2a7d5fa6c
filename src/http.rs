//! Shared REST transport for the TrainTrack backend.
//!
//! Thin wrapper over `reqwest` that issues one-shot JSON requests and folds
//! every failure into `ApiError`. Pure normalization in
//! `normalize_error_response`/`parse_success` for testability.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ApiError;

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone, Debug)]
pub struct ApiHttp {
    http: reqwest::Client,
    base_url: String,
}

impl ApiHttp {
    /// Build a transport for `config.api_base_url` with its timeouts.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;
        Ok(Self { http, base_url: crate::config::normalize_base_url(&config.api_base_url) })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get_json<R>(&self, path: &str, query: &[(&str, String)]) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let request = self.http.get(self.url(path)).query(query);
        self.execute(Method::GET, path, request).await
    }

    pub(crate) async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        self.execute(Method::POST, path, request).await
    }

    pub(crate) async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.http.put(self.url(path)).json(body);
        self.execute(Method::PUT, path, request).await
    }

    async fn execute<R>(&self, method: Method, path: &str, request: RequestBuilder) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        tracing::debug!(%method, path, "api request");

        let response = request.send().await.map_err(|e| transport_error(&method, path, &e))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(&method, path, &e))?;

        if !(200..300).contains(&status) {
            let err = normalize_error_response(status, &text);
            tracing::warn!(%method, path, status, error = %err, "api request failed");
            return Err(err);
        }

        parse_success(status, &text).inspect_err(|err| {
            tracing::warn!(%method, path, status, error = %err, "api response undecodable");
        })
    }
}

fn transport_error(method: &Method, path: &str, e: &reqwest::Error) -> ApiError {
    tracing::warn!(%method, path, error = %e, "api transport failure");
    ApiError::network()
}

// =============================================================================
// NORMALIZATION
// =============================================================================

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: Option<String>,
    #[serde(default)]
    email_not_verified: bool,
    email: Option<String>,
}

/// Fold a non-2xx response into `ApiError`.
///
/// A JSON body with a string `error` field wins and its message passes
/// through unchanged; otherwise the status picks a generic message.
pub(crate) fn normalize_error_response(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(message), email_not_verified, email }) => {
            ApiError::from_body(status, message, email_not_verified, email)
        }
        _ => ApiError::from_status(status),
    }
}

/// Decode a 2xx body. An empty body decodes as JSON `null`.
pub(crate) fn parse_success<R>(status: u16, body: &str) -> Result<R, ApiError>
where
    R: DeserializeOwned,
{
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|_| ApiError::invalid_response(Some(status)))
}
