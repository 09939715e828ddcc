//! Authentication error taxonomy and backend status translation.

use serde::Serialize;
use thiserror::Error;

use janus_backend::{BackendError, BackendStatus};

/// Backend status codes with a dedicated error kind.
///
/// These are backend-defined constants; they are matched verbatim and
/// never reinterpreted.
const CODE_UNKNOWN_USER: i32 = 11020003;
const CODE_BAD_CREDENTIALS: i32 = 11020004;
const CODE_DISABLED: i32 = 11020014;
const CODE_DISABLED_ALT: i32 = 11020024;
const CODE_CREDENTIALS_EXPIRED: i32 = 11020025;
const CODE_CREDENTIALS_EXPIRED_ALT: i32 = 11070002;
const CODE_LOCKED: i32 = 11050002;

/// Code reserved for faults raised by this subsystem itself, as opposed to
/// faults reported by the backend.
pub const INTERNAL_ERROR_CODE: &str = "50000000";

/// Authentication failure, translated from a backend status or raised by
/// the agent itself.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend does not know the user.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// The presented credentials were rejected.
    #[error("bad credentials: {0}")]
    BadCredentials(String),

    /// The account is disabled.
    #[error("account disabled: {0}")]
    Disabled(String),

    /// The credentials have expired.
    #[error("credentials expired: {0}")]
    CredentialsExpired(String),

    /// The account is locked.
    #[error("account locked: {0}")]
    Locked(String),

    /// A backend failure without a dedicated kind; the original code is
    /// preserved.
    #[error("{message}")]
    Backend {
        /// Backend-defined status code.
        code: i32,
        /// Backend-supplied message.
        message: String,
    },

    /// A fault in the agent itself rather than a backend verdict.
    #[error("{0}")]
    Internal(String),
}

impl AuthError {
    /// Translates a backend status into an error kind.
    ///
    /// Pure: the same status always yields the same kind. Codes outside
    /// the fixed table fall through to [`AuthError::Backend`] with the
    /// original code preserved. An empty backend message is replaced by a
    /// synthesized one.
    pub fn from_status(status: &BackendStatus) -> Self {
        let message = if status.message.is_empty() {
            format!("authentication failed with status: {}", status.code)
        } else {
            status.message.clone()
        };

        match status.code {
            CODE_UNKNOWN_USER => AuthError::UnknownUser(message),
            CODE_BAD_CREDENTIALS => AuthError::BadCredentials(message),
            CODE_DISABLED | CODE_DISABLED_ALT => AuthError::Disabled(message),
            CODE_CREDENTIALS_EXPIRED | CODE_CREDENTIALS_EXPIRED_ALT => {
                AuthError::CredentialsExpired(message)
            }
            CODE_LOCKED => AuthError::Locked(message),
            code => AuthError::Backend { code, message },
        }
    }

    /// Canonical error code for envelopes.
    ///
    /// Named kinds report the backend constant they translate;
    /// [`AuthError::Internal`] reports the agent's own reserved code.
    pub fn code(&self) -> String {
        match self {
            AuthError::UnknownUser(_) => CODE_UNKNOWN_USER.to_string(),
            AuthError::BadCredentials(_) => CODE_BAD_CREDENTIALS.to_string(),
            AuthError::Disabled(_) => CODE_DISABLED.to_string(),
            AuthError::CredentialsExpired(_) => CODE_CREDENTIALS_EXPIRED.to_string(),
            AuthError::Locked(_) => CODE_LOCKED.to_string(),
            AuthError::Backend { code, .. } => code.to_string(),
            AuthError::Internal(_) => INTERNAL_ERROR_CODE.to_string(),
        }
    }

    /// The failure message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            AuthError::UnknownUser(message)
            | AuthError::BadCredentials(message)
            | AuthError::Disabled(message)
            | AuthError::CredentialsExpired(message)
            | AuthError::Locked(message)
            | AuthError::Internal(message) => message,
            AuthError::Backend { message, .. } => message,
        }
    }
}

impl From<BackendError> for AuthError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Status(status) => AuthError::from_status(&status),
            other => AuthError::Internal(other.to_string()),
        }
    }
}

/// Error raised while handling one dispatched agent operation.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Authentication failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A response body could not be produced.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure body for agent-side faults.
///
/// Unlike backend envelopes, the code is a string: the `50`-prefixed range
/// is reserved for this subsystem's own faults.
#[derive(Debug, Serialize)]
pub struct AgentErrorBody {
    /// Always `false`.
    pub result: bool,
    /// Error code as a string.
    #[serde(rename = "errorCode")]
    pub error_code: String,
    /// Failure message. Never contains a backtrace.
    #[serde(rename = "errorMessage")]
    pub error_message: String,
}

impl AgentErrorBody {
    /// Creates a failure body.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            result: false,
            error_code: code.into(),
            error_message: message.into(),
        }
    }

    /// Failure body for a translated authentication error.
    pub fn from_auth(error: &AuthError) -> Self {
        Self::new(error.code(), error.message())
    }
}
