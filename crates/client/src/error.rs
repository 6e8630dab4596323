//! Client error types.

use thiserror::Error;

/// Errors that can occur in the client draft store.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server did not answer within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a failure envelope.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// User-facing message from the server.
        message: String,
    },

    /// Reading or writing local state failed.
    #[error("local storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation is not allowed in the current session mode.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Input rejected before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the server reported that the user does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }
}
