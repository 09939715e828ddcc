//! Two-phase authentication handshake: delegate, then hydrate.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use janus_backend::{
    AuthnOperation, DecoratedRequest, DirectoryError, ResponseContext, SsoBackend, UserDirectory,
};

use crate::error::AuthError;
use crate::principal::UserPrincipal;
use crate::token::SsoAuthentication;

/// Orchestrates one authentication attempt against the backend.
///
/// Login, refresh and logout share this service; the caller supplies the
/// operation code appropriate to the call. The service keeps no state of
/// its own beyond its collaborators and persists nothing.
pub struct AuthenticationService {
    backend: Arc<dyn SsoBackend>,
    directory: Option<Arc<dyn UserDirectory>>,
}

impl AuthenticationService {
    /// Creates a service with no local user directory; authorities default
    /// to empty.
    pub fn new(backend: Arc<dyn SsoBackend>) -> Self {
        Self {
            backend,
            directory: None,
        }
    }

    /// Supplies a local user directory to hydrate authorities from.
    pub fn with_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Runs the handshake for an unauthenticated token.
    ///
    /// On success, returns the authenticated token together with the
    /// response headers accumulated during the exchange. On backend
    /// rejection, the status is translated and no token is returned. An
    /// already-authenticated token passes through untouched.
    pub async fn authenticate(
        &self,
        token: SsoAuthentication,
        operation: AuthnOperation,
    ) -> Result<(SsoAuthentication, ResponseContext), AuthError> {
        let (request, mut context) = match token {
            SsoAuthentication::Unauthenticated { request, response } => (request, response),
            authenticated @ SsoAuthentication::Authenticated { .. } => {
                return Ok((authenticated, ResponseContext::new()));
            }
        };

        let decorated = DecoratedRequest::new(request)
            .with_agent_kind()
            .with_operation(operation);

        let status = self.backend.authenticate(&decorated, &mut context).await?;
        if !status.is_success() {
            return Err(AuthError::from_status(&status));
        }
        debug!(code = status.code, "SSO backend accepted the handshake");

        let record = self.backend.fetch_user(&decorated, &mut context).await?;
        let authorities = self.load_authorities(&record.user_id).await?;

        let principal = UserPrincipal::from_record(record, authorities.clone());
        Ok((
            SsoAuthentication::authenticated(principal, authorities),
            context,
        ))
    }

    async fn load_authorities(&self, username: &str) -> Result<BTreeSet<String>, AuthError> {
        let Some(directory) = &self.directory else {
            return Ok(BTreeSet::new());
        };
        match directory.load_user(username).await {
            Ok(user) => Ok(user.authorities),
            // Absence from the local directory is not an authentication
            // failure; the backend already vouched for the identity.
            Err(DirectoryError::NotFound(_)) => Ok(BTreeSet::new()),
            Err(error) => Err(AuthError::Internal(error.to_string())),
        }
    }
}
