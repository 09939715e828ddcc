//! Backend call error types.

use thiserror::Error;

use crate::status::BackendStatus;

/// Errors produced by a call against the SSO backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend processed the call and reported a structured failure.
    #[error("{0}")]
    Status(BackendStatus),

    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something the agent cannot interpret.
    #[error("backend protocol error: {0}")]
    Protocol(String),
}

impl BackendError {
    /// The structured status, when the backend reported one.
    pub fn status(&self) -> Option<&BackendStatus> {
        match self {
            BackendError::Status(status) => Some(status),
            _ => None,
        }
    }
}
