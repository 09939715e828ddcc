//! The authentication token passed through the pipeline.

use std::collections::BTreeSet;

use janus_backend::{AgentRequest, ResponseContext};

use crate::principal::UserPrincipal;

/// Two-state identity credential.
///
/// A token is exactly one variant at a time. The unauthenticated variant
/// carries the raw exchange so the handshake can delegate it; the
/// authenticated variant carries only the principal and authorities,
/// never a request or response reference.
#[derive(Debug)]
pub enum SsoAuthentication {
    /// A login/refresh attempt that has not been validated yet.
    Unauthenticated {
        /// Snapshot of the inbound request.
        request: AgentRequest,
        /// Buffer for response headers produced during the exchange.
        response: ResponseContext,
    },
    /// A validated identity.
    Authenticated {
        /// The authenticated principal.
        principal: UserPrincipal,
        /// Authorities granted to the session. Immutable after construction.
        authorities: BTreeSet<String>,
    },
}

impl SsoAuthentication {
    /// Creates an unauthenticated token at the start of an attempt.
    pub fn unauthenticated(request: AgentRequest) -> Self {
        SsoAuthentication::Unauthenticated {
            request,
            response: ResponseContext::new(),
        }
    }

    /// Creates an authenticated token. Only the authentication service
    /// should need to call this outside of tests.
    pub fn authenticated(principal: UserPrincipal, authorities: BTreeSet<String>) -> Self {
        SsoAuthentication::Authenticated {
            principal,
            authorities,
        }
    }

    /// Whether this token is the authenticated variant.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SsoAuthentication::Authenticated { .. })
    }

    /// The principal, when authenticated.
    pub fn principal(&self) -> Option<&UserPrincipal> {
        match self {
            SsoAuthentication::Authenticated { principal, .. } => Some(principal),
            SsoAuthentication::Unauthenticated { .. } => None,
        }
    }

    /// The authority set, when authenticated.
    pub fn authorities(&self) -> Option<&BTreeSet<String>> {
        match self {
            SsoAuthentication::Authenticated { authorities, .. } => Some(authorities),
            SsoAuthentication::Unauthenticated { .. } => None,
        }
    }

    /// The principal name, when authenticated.
    pub fn name(&self) -> Option<&str> {
        self.principal().map(UserPrincipal::name)
    }
}
