//! Webex API error types.

use callbridge_mcp_sdk::ToolError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebexError>;

#[derive(Debug, Error)]
pub enum WebexError {
    /// A required argument was missing or unusable. Never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Authentication failed (HTTP 401): {detail}. Check that WEBEX_ACCESS_TOKEN is valid, unexpired, and carries the required scopes")]
    Auth { detail: String },

    #[error("Permission denied (HTTP 403): {detail}. {hint}")]
    Forbidden { detail: String, hint: &'static str },

    #[error("Not found (HTTP 404): {detail}. {hint}")]
    NotFound { detail: String, hint: &'static str },

    #[error("Rate limited (HTTP 429): {detail}. Back off before retrying")]
    RateLimited { detail: String },

    /// HTTP 400. `retryable` is true when the body indicates malformed
    /// input, i.e. a different parameter shape may be accepted.
    #[error("Request rejected (HTTP 400): {message}")]
    Rejected { message: String, retryable: bool },

    /// Every request variant was rejected as malformed input.
    #[error("{0}")]
    RetryExhausted(String),

    #[error("Unexpected upstream status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl WebexError {
    /// True when trying the next request variant is worthwhile.
    pub fn is_retryable_rejection(&self) -> bool {
        matches!(self, WebexError::Rejected { retryable: true, .. })
    }
}

impl From<WebexError> for ToolError {
    fn from(err: WebexError) -> Self {
        match err {
            WebexError::InvalidArgument(msg) => ToolError::InvalidInput(msg),
            WebexError::Auth { .. } | WebexError::Forbidden { .. } => {
                ToolError::PermissionDenied(err.to_string())
            }
            WebexError::NotFound { .. } => ToolError::NotFound(err.to_string()),
            WebexError::RateLimited { .. } => ToolError::RateLimited(err.to_string()),
            other => ToolError::Upstream(other.to_string()),
        }
    }
}
