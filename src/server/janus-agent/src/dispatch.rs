//! Request dispatch over the configured operation table.

use std::sync::Arc;

use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Method, Response, StatusCode};
use tracing::warn;

use janus_backend::{AgentRequest, ResponseContext, SsoBackend, UserDirectory};

use crate::authentication::AuthenticationService;
use crate::error::{AgentError, AgentErrorBody, INTERNAL_ERROR_CODE};
use crate::logout::LogoutOrchestrator;
use crate::operations::{
    AgentOperation, CheckOperation, ConfigOperation, DuplicateOperation, KeyOperation,
    LogoutOperation, SignOnOperation, TfaOperation,
};

/// Fallback body used when even the failure envelope cannot be serialized.
const FALLBACK_FAULT: &str =
    r#"{"result":false,"errorCode":"50000000","errorMessage":"serialization failure"}"#;

/// Static configuration of the agent surface.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Prefix under which the agent operations are mounted.
    pub path_prefix: String,
    /// Site id supplemented into logout requests when absent.
    pub site_id: Option<String>,
    /// Return URL supplemented into logout requests when absent.
    pub return_url: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/sso".to_string(),
            site_id: None,
            return_url: None,
        }
    }
}

/// Joins path segments into one normalized absolute path.
///
/// Empty segments and repeated slashes collapse; the result always starts
/// with `/` and never ends with one (except the root itself).
pub fn normalize_path(segments: &[&str]) -> String {
    let parts: Vec<&str> = segments
        .iter()
        .flat_map(|segment| segment.split('/'))
        .filter(|part| !part.is_empty())
        .collect();
    format!("/{}", parts.join("/"))
}

/// One routing entry: method, exact path and the operation it invokes.
pub struct OperationDescriptor {
    method: Method,
    path: String,
    operation: Arc<dyn AgentOperation>,
}

impl OperationDescriptor {
    /// Creates a descriptor.
    pub fn new(method: Method, path: impl Into<String>, operation: Arc<dyn AgentOperation>) -> Self {
        Self {
            method,
            path: path.into(),
            operation,
        }
    }

    /// Whether this descriptor matches the request line.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.path == path
    }
}

/// Routes inbound requests to the configured agent operations.
///
/// The table is built once at startup and never mutated; descriptors match
/// in declaration order and the first match wins. Requests matching no
/// descriptor cause no side effect at all - the caller passes them on to
/// the rest of its pipeline.
pub struct AgentDispatcher {
    operations: Vec<OperationDescriptor>,
}

impl AgentDispatcher {
    /// Starts building a dispatcher with operations under `prefix`.
    pub fn builder(prefix: impl Into<String>) -> AgentDispatcherBuilder {
        AgentDispatcherBuilder {
            prefix: prefix.into(),
            descriptors: Vec::new(),
        }
    }

    /// Builds the standard operation table against one backend.
    pub fn standard(
        config: &AgentConfig,
        backend: Arc<dyn SsoBackend>,
        directory: Option<Arc<dyn UserDirectory>>,
    ) -> Self {
        let mut service = AuthenticationService::new(Arc::clone(&backend));
        if let Some(directory) = directory {
            service = service.with_directory(directory);
        }
        let service = Arc::new(service);

        let mut orchestrator = LogoutOrchestrator::new(Arc::clone(&backend));
        if let Some(site_id) = &config.site_id {
            orchestrator = orchestrator.with_site_id(site_id);
        }
        if let Some(return_url) = &config.return_url {
            orchestrator = orchestrator.with_return_url(return_url);
        }

        Self::builder(&config.path_prefix)
            .operation(
                Method::POST,
                "/check",
                Arc::new(CheckOperation::new(Arc::clone(&backend))),
            )
            .operation(
                Method::POST,
                "/config",
                Arc::new(ConfigOperation::new(Arc::clone(&backend))),
            )
            .operation(
                Method::POST,
                "/duplication",
                Arc::new(DuplicateOperation::new(Arc::clone(&backend))),
            )
            .operation(
                Method::POST,
                "/tfa",
                Arc::new(TfaOperation::new(Arc::clone(&backend))),
            )
            .operation(
                Method::POST,
                "/key",
                Arc::new(KeyOperation::new(Arc::clone(&backend))),
            )
            .operation(
                Method::POST,
                "/login",
                Arc::new(SignOnOperation::login(Arc::clone(&service))),
            )
            .operation(
                Method::POST,
                "/logout",
                Arc::new(LogoutOperation::new(Arc::new(orchestrator))),
            )
            .operation(
                Method::POST,
                "/refresh_token",
                Arc::new(SignOnOperation::refresh(service)),
            )
            .build()
    }

    /// Derived matcher: whether any descriptor matches the request line.
    ///
    /// Lets a surrounding pipeline pre-filter requests into this
    /// subsystem's scope without invoking anything.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.operations
            .iter()
            .any(|descriptor| descriptor.matches(method, path))
    }

    /// Dispatches one request.
    ///
    /// Returns `None` without side effects when nothing matches. Otherwise
    /// the matched operation runs exactly once and exactly one response is
    /// produced; operation errors are intercepted here and rendered as the
    /// generic failure envelope, never propagated to the caller.
    pub async fn dispatch(&self, request: AgentRequest) -> Option<Response<String>> {
        let descriptor = self
            .operations
            .iter()
            .find(|descriptor| descriptor.matches(request.method(), request.path()))?;

        let (body, context) = match descriptor.operation.handle(request).await {
            Ok(output) => (output.body, output.response),
            Err(error) => (fault_body(&error), ResponseContext::new()),
        };

        let mut response = Response::new(body);
        *response.status_mut() = StatusCode::OK;
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json;charset=UTF-8"),
        );
        context.merge_into(response.headers_mut());
        Some(response)
    }
}

fn fault_body(error: &AgentError) -> String {
    warn!(%error, "agent operation failed");
    // Message verbatim, no backtraces.
    let fault = AgentErrorBody::new(INTERNAL_ERROR_CODE, error.to_string());
    serde_json::to_string(&fault).unwrap_or_else(|_| FALLBACK_FAULT.to_string())
}

/// Builder for [`AgentDispatcher`].
pub struct AgentDispatcherBuilder {
    prefix: String,
    descriptors: Vec<OperationDescriptor>,
}

impl AgentDispatcherBuilder {
    /// Registers an operation under `prefix` + `suffix`.
    ///
    /// Descriptors match in registration order; overlapping entries are a
    /// configuration mistake and are not checked at runtime.
    pub fn operation(
        mut self,
        method: Method,
        suffix: &str,
        operation: Arc<dyn AgentOperation>,
    ) -> Self {
        let path = normalize_path(&[self.prefix.as_str(), suffix]);
        self.descriptors
            .push(OperationDescriptor::new(method, path, operation));
        self
    }

    /// Finishes the table.
    pub fn build(self) -> AgentDispatcher {
        AgentDispatcher {
            operations: self.descriptors,
        }
    }
}
