//! # Janus Agent
//!
//! The SSO agent core: routes inbound agent requests to their operations,
//! drives the delegate-then-hydrate authentication handshake, and
//! translates backend status codes into a typed error taxonomy.
//!
//! The agent is transport-light: it consumes [`janus_backend::AgentRequest`]
//! snapshots and produces plain `http` responses, so it can sit astride any
//! HTTP pipeline. Wiring into a concrete server lives in `janus-server`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authentication;
pub mod dispatch;
pub mod error;
pub mod logout;
pub mod operations;
pub mod principal;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use authentication::AuthenticationService;
pub use dispatch::{
    normalize_path, AgentConfig, AgentDispatcher, AgentDispatcherBuilder, OperationDescriptor,
};
pub use error::{AgentError, AgentErrorBody, AuthError, INTERNAL_ERROR_CODE};
pub use logout::LogoutOrchestrator;
pub use operations::{
    AgentOperation, AuthenticationFailureHandler, AuthenticationSuccessHandler, CheckOperation,
    ConfigOperation, DuplicateOperation, EnvelopeFailureHandler, JsonSuccessHandler, KeyOperation,
    LogoutOperation, OperationOutput, SignOnOperation, TfaOperation,
};
pub use principal::UserPrincipal;
pub use token::SsoAuthentication;
