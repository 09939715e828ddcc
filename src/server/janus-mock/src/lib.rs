//! # Janus Mock Backend
//!
//! A protocol-compatible simulator of the SSO backend for environments
//! where the real service is unavailable.
//!
//! Two pieces:
//!
//! - [`MockSsoBackend`] implements the [`janus_backend::SsoBackend`]
//!   contract so the agent runs unchanged against it;
//! - [`server::router`] serves the backend's own external endpoints
//!   (`logonService`, `checkService`, `logoffService`).
//!
//! Identity travels as a base64-encoded username in a cookie. That is a
//! functional simulation, not security; never enable this crate's wiring
//! outside development or test configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod codec;
pub mod directory;
pub mod server;

pub use backend::MockSsoBackend;
pub use codec::{decode_username, encode_username, MOCK_COOKIE};
pub use directory::{hash_password, verify_password, InMemoryUserDirectory};
pub use server::{router, CHECK_PATH, LOGOFF_PATH, LOGON_PATH};
