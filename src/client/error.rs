//! Error types for API calls.

use thiserror::Error;

/// Shown when the backend gives no usable message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Request failed. Please try again.";

/// Errors that can occur while calling the backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network connectivity error (DNS, connection refused, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Backend answered with a 4xx or 5xx status.
    #[error("Backend error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// Backend answered 2xx but the envelope reports `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Response body doesn't match the expected envelope.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(String),

    /// An id that cannot be placed in a request path.
    #[error("Invalid path segment: {0:?}")]
    InvalidPath(String),

    /// Client construction or request URL problem.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// HTTP status attached to the failure, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for an inline error banner.
    ///
    /// Uses the backend's own message when the error payload carries one,
    /// otherwise [`GENERIC_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        let backend_message = match self {
            ClientError::Api { body: Some(body), .. } => extract_message(body),
            ClientError::Rejected(msg) if !msg.trim().is_empty() => Some(msg.clone()),
            _ => None,
        };
        backend_message.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
    }
}

/// Pull a human-readable message out of an error payload.
///
/// Looks at `msg` first (the envelope field), then `message`, `detail` and
/// `error`. A bare JSON string is taken as the message.
pub fn extract_message(body: &serde_json::Value) -> Option<String> {
    if let Some(s) = body.as_str() {
        return (!s.trim().is_empty()).then(|| s.to_string());
    }
    ["msg", "message", "detail", "error"]
        .iter()
        .filter_map(|key| body.get(key).and_then(|v| v.as_str()))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}
