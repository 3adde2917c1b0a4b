//! Apigee client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Apigee management API
#[derive(Debug, Error)]
pub enum ApigeeError {
    /// Transport-level failure (connect, timeout, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a status the operation does not accept
    #[error("{method} {url} returned unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP method of the failed request
        method: &'static str,
        /// Request URL
        url: String,
        /// Status code returned by the API
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApigeeError {
    /// The HTTP status the API answered with, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            ApigeeError::UnexpectedStatus { status, .. } => Some(*status),
            ApigeeError::Http(e) => e.status().map(|s| s.as_u16()),
            ApigeeError::Serialization(_) => None,
        }
    }
}
