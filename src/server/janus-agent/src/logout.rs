//! Logout orchestration.

use std::sync::Arc;

use tracing::warn;

use janus_backend::request::{param, OP};
use janus_backend::{AgentRequest, AuthnOperation, DecoratedRequest, ResponseContext, SsoBackend};

/// Fire-and-forget logout toward the backend.
///
/// The orchestrator exists to notify the backend, not to produce a
/// user-visible payload: whatever the backend answers is discarded, and a
/// backend failure never prevents the local session signal from being
/// cleared. Invoking it without a prior authenticated session is a no-op.
pub struct LogoutOrchestrator {
    backend: Arc<dyn SsoBackend>,
    site_id: Option<String>,
    return_url: Option<String>,
}

impl LogoutOrchestrator {
    /// Creates an orchestrator for the given backend.
    pub fn new(backend: Arc<dyn SsoBackend>) -> Self {
        Self {
            backend,
            site_id: None,
            return_url: None,
        }
    }

    /// Default site id supplemented when the request carries none.
    pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = Some(site_id.into());
        self
    }

    /// Default return URL supplemented when the request carries none.
    pub fn with_return_url(mut self, return_url: impl Into<String>) -> Self {
        self.return_url = Some(return_url.into());
        self
    }

    /// Signals the backend and returns the headers to emit (typically the
    /// cookie-clearing ones the backend appended).
    pub async fn logout(&self, request: AgentRequest) -> ResponseContext {
        let mut decorated = DecoratedRequest::new(request)
            .with_agent_kind()
            .add_param_if_absent(OP, AuthnOperation::Logout.code());
        if let Some(site_id) = &self.site_id {
            decorated = decorated.add_param_if_absent(param::SITE_ID, site_id);
        }
        if let Some(return_url) = &self.return_url {
            decorated = decorated.add_param_if_absent(param::RETURN_URL, return_url);
        }

        let mut context = ResponseContext::new();
        if let Err(error) = self.backend.logout(&decorated, &mut context).await {
            warn!(%error, "SSO logout signal failed; clearing local session anyway");
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubBackend;
    use http::Method;

    fn request() -> AgentRequest {
        AgentRequest::new(Method::POST, "/sso/logout")
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let backend = Arc::new(StubBackend::succeeding("alice"));
        let orchestrator = LogoutOrchestrator::new(backend.clone());

        let first = orchestrator.logout(request()).await;
        let second = orchestrator.logout(request()).await;

        // Same observable outcome both times, no error on the second call.
        assert_eq!(first.headers().len(), second.headers().len());
        assert_eq!(backend.logout_calls(), 2);
    }

    #[tokio::test]
    async fn backend_failure_is_swallowed() {
        let backend = Arc::new(StubBackend::unavailable());
        let orchestrator = LogoutOrchestrator::new(backend);

        let context = orchestrator.logout(request()).await;
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn defaults_supplement_but_do_not_override() {
        let backend = Arc::new(StubBackend::succeeding("alice"));
        let orchestrator = LogoutOrchestrator::new(backend.clone())
            .with_site_id("site-default")
            .with_return_url("/app");

        let explicit = request().with_param(param::SITE_ID, "site-explicit");
        orchestrator.logout(explicit).await;

        let seen = backend.last_logout_params();
        assert_eq!(seen.get(param::SITE_ID).map(String::as_str), Some("site-explicit"));
        assert_eq!(seen.get(param::RETURN_URL).map(String::as_str), Some("/app"));
        assert_eq!(seen.get(OP).map(String::as_str), Some("LO"));
    }
}
