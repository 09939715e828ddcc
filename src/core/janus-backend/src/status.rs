//! Outcome types for a single backend call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a backend call succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The backend accepted the operation.
    Success,
    /// The backend rejected the operation; `code` says why.
    Failure,
}

/// Result of one call against the SSO backend.
///
/// `code` is a backend-defined numeric constant and is never reinterpreted
/// by this subsystem; translation into the error taxonomy happens in the
/// agent crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Backend-defined status code.
    pub code: i32,
    /// Human-readable message supplied by the backend (may be empty).
    pub message: String,
    /// Success or failure.
    pub outcome: Outcome,
}

impl BackendStatus {
    /// Creates a success status.
    pub fn success(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            outcome: Outcome::Success,
        }
    }

    /// Creates a failure status.
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            outcome: Outcome::Failure,
        }
    }

    /// Returns `true` when the outcome is [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "status {}", self.code)
        } else {
            write!(f, "status {}: {}", self.code, self.message)
        }
    }
}

/// Authentication state reported by a check call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthnState {
    /// An SSO session exists and was validated.
    #[serde(rename = "SSO_SUCCESS")]
    SsoSuccess,
    /// No SSO session yet (first visit).
    #[serde(rename = "SSO_FIRST")]
    SsoFirst,
}

impl AuthnState {
    /// Wire name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            AuthnState::SsoSuccess => "SSO_SUCCESS",
            AuthnState::SsoFirst => "SSO_FIRST",
        }
    }
}

/// A pending multi-factor challenge issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MfaChallenge {
    /// Challenge identifier.
    pub id: String,
    /// Device the challenge was delivered to.
    pub device: String,
    /// Delivery method (e.g. push, otp).
    pub method: String,
    /// Minutes until the challenge expires.
    pub timeout_minutes: u32,
}

/// Result of asking the backend for an MFA challenge.
///
/// Absence of a challenge is not an error at the transport level; the
/// backend reports the status it last produced so the caller can render it.
#[derive(Debug, Clone)]
pub enum MfaOutcome {
    /// A challenge is pending.
    Challenge(MfaChallenge),
    /// No challenge; the last backend status explains why.
    Unavailable(BackendStatus),
}

/// Canonical failure body for backend-reported errors.
///
/// The simulator and the duplicate/key operations render this shape with
/// the backend's numeric code. The dispatcher's own internal-fault envelope
/// uses a string code instead (the `50`-prefixed range is reserved for
/// agent-side faults) and lives with the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub result: bool,
    /// Backend-defined numeric error code.
    pub error_code: i32,
    /// Human-readable message.
    pub error_message: String,
}

impl ErrorEnvelope {
    /// Creates a failure envelope.
    pub fn new(error_code: i32, error_message: impl Into<String>) -> Self {
        Self {
            result: false,
            error_code,
            error_message: error_message.into(),
        }
    }
}

impl From<&BackendStatus> for ErrorEnvelope {
    fn from(status: &BackendStatus) -> Self {
        Self::new(status.code, status.message.clone())
    }
}
