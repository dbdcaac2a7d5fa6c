//! Normalized error shapes.
//!
//! DESIGN
//! ======
//! Every failure a client call can produce is folded into one `ApiError`
//! before it reaches a page controller, so pages never inspect transport
//! errors. Storage failures are separate: the session store logs and
//! swallows them, only the CLI surfaces them.

pub const NETWORK_ERROR_MESSAGE: &str = "Cannot connect to server. Please check if the server is running.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server";

/// Coarse classification of an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Rejected locally; no request was sent.
    Validation,
    /// No response at all (connect refused, timeout, DNS).
    Network,
    /// 5xx response.
    Server,
    /// 4xx response, usually with a structured body from the backend.
    Domain,
    /// 2xx response whose body is missing the expected payload.
    InvalidResponse,
}

/// The single error shape handed to callers of the auth and prediction clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// Human-readable message, safe to show next to a form.
    pub message: String,
    /// Original HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Set when the backend refused login because the email is unverified.
    pub email_not_verified: bool,
    /// Email echoed back by the backend alongside `email_not_verified`.
    pub email: Option<String>,
}

impl ApiError {
    fn new(kind: ApiErrorKind, message: impl Into<String>, status: Option<u16>) -> Self {
        Self { kind, message: message.into(), status, email_not_verified: false, email: None }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message, None)
    }

    #[must_use]
    pub fn network() -> Self {
        Self::new(ApiErrorKind::Network, NETWORK_ERROR_MESSAGE, None)
    }

    #[must_use]
    pub fn server(status: u16) -> Self {
        Self::new(ApiErrorKind::Server, SERVER_ERROR_MESSAGE, Some(status))
    }

    #[must_use]
    pub fn invalid_response(status: Option<u16>) -> Self {
        Self::new(ApiErrorKind::InvalidResponse, INVALID_RESPONSE_MESSAGE, status)
    }

    /// Structured backend error body; the message passes through unchanged.
    #[must_use]
    pub fn from_body(status: u16, message: String, email_not_verified: bool, email: Option<String>) -> Self {
        let kind = if status >= 500 { ApiErrorKind::Server } else { ApiErrorKind::Domain };
        Self { kind, message, status: Some(status), email_not_verified, email }
    }

    /// Non-success status with no usable body.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        if status >= 500 {
            Self::server(status)
        } else {
            Self::new(ApiErrorKind::Domain, GENERIC_ERROR_MESSAGE, Some(status))
        }
    }

    /// A 4xx whose body carried no message of its own.
    #[must_use]
    pub fn is_bodiless_rejection(&self) -> bool {
        self.kind == ApiErrorKind::Domain && self.message == GENERIC_ERROR_MESSAGE
    }
}

/// Failures of the durable key-value slot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("session encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}
