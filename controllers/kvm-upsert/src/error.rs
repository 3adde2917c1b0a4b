//! Upsert error types.
//!
//! Every failure is terminal. Variants name the step that failed and carry
//! the remote status where one was observed.

use apigee_client::ApigeeError;
use gcp_auth::AuthError;
use std::fmt;
use thiserror::Error;

/// Reconciliation step, used to label transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Query,
    Delete,
    Insert,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Query => "inquire KVM entry",
            Step::Delete => "delete existing KVM entry",
            Step::Insert => "insert new KVM entry",
        })
    }
}

/// Errors that can occur while upserting a KVM entry.
#[derive(Debug, Error)]
pub enum UpsertError {
    /// Token could not be obtained
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Query answered with something other than 200 or 404
    #[error("cannot inquire KVM entry (status: {status})")]
    QueryFailed { status: u16 },

    /// Delete answered with something other than 200
    #[error("cannot delete existing KVM entry (status: {status})")]
    DeleteFailed { status: u16 },

    /// Insert answered with something other than 201
    #[error("cannot insert new KVM entry (status: {status})")]
    InsertFailed { status: u16 },

    /// A step failed before any status was received, or the body was unusable
    #[error("cannot {step}: {source}")]
    Transport {
        step: Step,
        #[source]
        source: ApigeeError,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The whole run took longer than allowed
    #[error("deadline of {0}s exceeded")]
    DeadlineExceeded(u64),
}

impl UpsertError {
    /// Classify a client error raised during `step`
    pub(crate) fn at(step: Step, source: ApigeeError) -> Self {
        let status = match &source {
            ApigeeError::UnexpectedStatus { status, .. } => Some(*status),
            ApigeeError::Http(_) | ApigeeError::Serialization(_) => None,
        };
        match (step, status) {
            (Step::Query, Some(status)) => UpsertError::QueryFailed { status },
            (Step::Delete, Some(status)) => UpsertError::DeleteFailed { status },
            (Step::Insert, Some(status)) => UpsertError::InsertFailed { status },
            (_, None) => UpsertError::Transport { step, source },
        }
    }

    /// The remote HTTP status behind this error, if one was observed
    pub fn status(&self) -> Option<u16> {
        match self {
            UpsertError::QueryFailed { status }
            | UpsertError::DeleteFailed { status }
            | UpsertError::InsertFailed { status } => Some(*status),
            UpsertError::Auth(e) => e.status(),
            UpsertError::Transport { source, .. } => source.status(),
            UpsertError::InvalidConfig(_) | UpsertError::DeadlineExceeded(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unexpected(status: u16) -> ApigeeError {
        ApigeeError::UnexpectedStatus {
            method: "GET",
            url: "https://apigee.example.com/x".to_string(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_status_errors_map_to_step() {
        assert!(matches!(UpsertError::at(Step::Query, unexpected(500)), UpsertError::QueryFailed { status: 500 }));
        assert!(matches!(UpsertError::at(Step::Delete, unexpected(409)), UpsertError::DeleteFailed { status: 409 }));
        assert!(matches!(UpsertError::at(Step::Insert, unexpected(400)), UpsertError::InsertFailed { status: 400 }));
    }

    #[test]
    fn test_decode_failure_is_transport() {
        let source = ApigeeError::Serialization(serde_json::from_str::<u8>("x").unwrap_err());
        let err = UpsertError::at(Step::Insert, source);
        assert!(matches!(err, UpsertError::Transport { step: Step::Insert, .. }));
        assert_eq!(err.status(), None);
        assert!(err.to_string().starts_with("cannot insert new KVM entry"));
    }

    #[test]
    fn test_auth_status_is_exposed() {
        let err = UpsertError::from(AuthError::TokenFetchFailed { status: 503 });
        assert_eq!(err.status(), Some(503));
    }
}
