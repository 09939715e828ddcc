//! Backend lifecycle.
//!
//! The backend client is initialized exactly once by the process entry
//! point; the resulting handle is passed explicitly to every component
//! that needs it and shut down on exit. There is no implicit global
//! re-initialization path.

use std::sync::Arc;

use tracing::info;

use crate::backend::SsoBackend;

/// Handle to an initialized SSO backend.
#[derive(Clone)]
pub struct BackendHandle {
    backend: Arc<dyn SsoBackend>,
}

impl BackendHandle {
    /// Initializes the backend and returns the process-wide handle.
    pub fn initialize(backend: Arc<dyn SsoBackend>) -> Self {
        info!(backend = backend.name(), "SSO backend initialized");
        Self { backend }
    }

    /// The backend this handle was initialized with.
    pub fn backend(&self) -> Arc<dyn SsoBackend> {
        Arc::clone(&self.backend)
    }

    /// Releases the backend.
    pub fn shutdown(self) {
        info!(backend = self.backend.name(), "SSO backend shut down");
    }
}
