//! # Janus Backend Contract
//!
//! Collaborator contracts for the Janus SSO agent.
//!
//! The real SSO backend is a proprietary, opaque service. This crate pins
//! down everything the rest of the workspace is allowed to know about it:
//!
//! - [`SsoBackend`] - the delegate the agent hands authentication to
//! - [`UserDirectory`] - the local user store consulted for authorities
//! - [`AgentRequest`] / [`DecoratedRequest`] - the request snapshot and the
//!   two-layer override view passed to the backend
//! - [`BackendStatus`] and friends - the outcome vocabulary of one backend call
//!
//! Implementations live elsewhere: the mock simulator in `janus-mock`, the
//! real client outside this repository.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod request;
pub mod status;
pub mod user;

pub use backend::SsoBackend;
pub use directory::{DirectoryError, DirectoryUser, UserDirectory};
pub use error::BackendError;
pub use lifecycle::BackendHandle;
pub use request::{
    AgentRequest, AuthnOperation, DecoratedRequest, ResponseContext, AGENT_KIND_HEADER,
    AGENT_KIND_SPA,
};
pub use status::{AuthnState, BackendStatus, ErrorEnvelope, MfaChallenge, MfaOutcome, Outcome};
pub use user::UserRecord;
