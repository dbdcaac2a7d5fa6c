//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_DIR: &str = ".traintrack";
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash, e.g. `http://localhost:8080/api`.
    pub api_base_url: String,
    pub timeouts: HttpTimeouts,
    /// Directory backing the durable session slot.
    pub session_dir: PathBuf,
    /// Delay before a page navigates after a successful (or unverified) submit.
    pub redirect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            timeouts: HttpTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `TRAINTRACK_API_BASE_URL`: default `http://localhost:8080/api`
    /// - `TRAINTRACK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TRAINTRACK_CONNECT_TIMEOUT_SECS`: default 10
    /// - `TRAINTRACK_SESSION_DIR`: default `.traintrack`
    /// - `TRAINTRACK_REDIRECT_DELAY_MS`: default 2000
    #[must_use]
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("TRAINTRACK_API_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_API_BASE_URL.to_owned(), |v| normalize_base_url(&v));
        let timeouts = HttpTimeouts {
            request_secs: env_parse("TRAINTRACK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("TRAINTRACK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let session_dir = std::env::var("TRAINTRACK_SESSION_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_DIR), PathBuf::from);
        let redirect_delay =
            Duration::from_millis(env_parse("TRAINTRACK_REDIRECT_DELAY_MS", DEFAULT_REDIRECT_DELAY_MS));

        Self { api_base_url, timeouts, session_dir, redirect_delay }
    }

    /// Override the base URL (e.g. from a CLI flag), trimming trailing slashes.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api_base_url = normalize_base_url(base_url);
        self
    }

    /// Shorter delay used by the forgot-password page before moving on.
    #[must_use]
    pub fn short_redirect_delay(&self) -> Duration {
        self.redirect_delay * 3 / 4
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
