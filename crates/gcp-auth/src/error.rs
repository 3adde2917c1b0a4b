//! Token resolution errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential helper `{command}` failed: {reason}")]
    SubprocessFailure { command: String, reason: String },

    #[error("minted access token is not valid (tokeninfo status: {status})")]
    InvalidToken { status: u16 },

    #[error("cannot retrieve access token from metadata server (status: {status})")]
    TokenFetchFailed { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuthError {
    /// The HTTP status that caused the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::InvalidToken { status } | AuthError::TokenFetchFailed { status } => Some(*status),
            AuthError::Http(e) => e.status().map(|s| s.as_u16()),
            AuthError::SubprocessFailure { .. } | AuthError::Serialization(_) => None,
        }
    }
}
