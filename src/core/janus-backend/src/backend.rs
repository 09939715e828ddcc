//! SSO backend trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;
use crate::request::{DecoratedRequest, ResponseContext};
use crate::status::{BackendStatus, MfaOutcome};
use crate::user::UserRecord;

/// The opaque SSO backend the agent delegates to.
///
/// Every method receives the decorated request and may append response
/// headers (session cookies and the like) to the [`ResponseContext`].
/// Calls are awaited inline; timeout and retry policy belong to the
/// implementation, not to the agent.
#[async_trait]
pub trait SsoBackend: Send + Sync {
    /// Validates the credentials or session material carried by the request.
    async fn authenticate(
        &self,
        request: &DecoratedRequest,
        response: &mut ResponseContext,
    ) -> Result<BackendStatus, BackendError>;

    /// Fetches the user record for the request's validated session.
    async fn fetch_user(
        &self,
        request: &DecoratedRequest,
        response: &mut ResponseContext,
    ) -> Result<UserRecord, BackendError>;

    /// Fetches the backend's agent-facing configuration document.
    async fn fetch_config(
        &self,
        request: &DecoratedRequest,
        response: &mut ResponseContext,
    ) -> Result<Value, BackendError>;

    /// Fetches the duplicate-session payload for the request's session.
    async fn fetch_duplicates(
        &self,
        request: &DecoratedRequest,
        response: &mut ResponseContext,
    ) -> Result<Value, BackendError>;

    /// Fetches the backend's public key.
    async fn fetch_public_key(
        &self,
        request: &DecoratedRequest,
        response: &mut ResponseContext,
    ) -> Result<String, BackendError>;

    /// Asks for a pending multi-factor challenge.
    async fn fetch_mfa_challenge(
        &self,
        request: &DecoratedRequest,
        response: &mut ResponseContext,
    ) -> Result<MfaOutcome, BackendError>;

    /// Notifies the backend that the session is over.
    ///
    /// Any payload the backend produces is discarded by the caller.
    async fn logout(
        &self,
        request: &DecoratedRequest,
        response: &mut ResponseContext,
    ) -> Result<(), BackendError>;

    /// Name of this backend for logging/debugging.
    fn name(&self) -> &'static str;
}
