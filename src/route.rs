//! View identifiers and their URL form.
//!
//! Routes carry their query parameters as typed fields so pages never parse
//! strings themselves. Unknown paths resolve to `Home`, matching the
//! catch-all redirect of the front end.

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/`, the prediction view.
    Home,
    /// `/login`, optionally remembering where to go after signing in.
    Login { return_url: Option<String> },
    Register,
    ForgotPassword,
    /// `/verify`, with the email to verify pre-filled when known.
    Verify { email: Option<String> },
    /// `/reset-password`; without an email the page bounces to forgot-password.
    ResetPassword { email: Option<String> },
    Prediction,
    Dashboard,
    Report,
}

impl Route {
    #[must_use]
    pub fn login() -> Self {
        Self::Login { return_url: None }
    }

    /// Whether the route guard must see a signed-in user first.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Home | Self::Prediction | Self::Dashboard | Self::Report)
    }

    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login { .. } => "/login",
            Self::Register => "/register",
            Self::ForgotPassword => "/forgot-password",
            Self::Verify { .. } => "/verify",
            Self::ResetPassword { .. } => "/reset-password",
            Self::Prediction => "/prediction",
            Self::Dashboard => "/dashboard",
            Self::Report => "/report",
        }
    }

    /// Path plus encoded query string.
    #[must_use]
    pub fn to_url(&self) -> String {
        let query = match self {
            Self::Login { return_url: Some(url) } => Some(("returnUrl", url)),
            Self::Verify { email: Some(email) } | Self::ResetPassword { email: Some(email) } => Some(("email", email)),
            _ => None,
        };
        match query {
            Some((key, value)) => format!("{}?{key}={}", self.path(), urlencoding::encode(value)),
            None => self.path().to_owned(),
        }
    }

    /// Resolve a URL produced by `to_url` (or typed by hand) back to a route.
    #[must_use]
    pub fn parse(url: &str) -> Self {
        let (path, query) = url.trim().split_once('?').unwrap_or((url.trim(), ""));
        let path = match path.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        let param = |name: &str| query_param(query, name);
        match path {
            "/login" => Self::Login { return_url: param("returnUrl") },
            "/register" => Self::Register,
            "/forgot-password" => Self::ForgotPassword,
            "/verify" => Self::Verify { email: param("email") },
            "/reset-password" => Self::ResetPassword { email: param("email") },
            "/prediction" => Self::Prediction,
            "/dashboard" => Self::Dashboard,
            "/report" => Self::Report,
            _ => Self::Home,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| *key == name)
        .and_then(|(_, raw)| {
            let raw = raw.replace('+', " ");
            urlencoding::decode(&raw).ok().map(|v| v.into_owned())
        })
        .filter(|v| !v.is_empty())
}
