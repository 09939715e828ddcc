//! Agent operation services.
//!
//! One service per routed operation. Every service decorates the inbound
//! snapshot with the client-kind marker before delegating, mirrors the
//! backend's response shapes, and leaves writing the response to the
//! dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use janus_backend::{
    AgentRequest, AuthnOperation, AuthnState, BackendError, DecoratedRequest, ErrorEnvelope,
    MfaOutcome, ResponseContext, SsoBackend, UserRecord,
};

use crate::authentication::AuthenticationService;
use crate::error::{AgentError, AgentErrorBody, AuthError};
use crate::logout::LogoutOrchestrator;
use crate::token::SsoAuthentication;

/// Payload produced by one agent operation.
pub struct OperationOutput {
    /// Response body (JSON except for the raw public-key operation).
    pub body: String,
    /// Response headers accumulated while talking to the backend.
    pub response: ResponseContext,
}

impl OperationOutput {
    /// Serializes a value with the given response headers.
    pub fn json_with<T: Serialize>(
        value: &T,
        response: ResponseContext,
    ) -> Result<Self, AgentError> {
        Ok(Self {
            body: serde_json::to_string(value)?,
            response,
        })
    }

    /// Wraps a pre-rendered body with the given response headers.
    pub fn raw(body: impl Into<String>, response: ResponseContext) -> Self {
        Self {
            body: body.into(),
            response,
        }
    }
}

/// A routed agent operation.
#[async_trait]
pub trait AgentOperation: Send + Sync {
    /// Handles one matched request and produces exactly one body.
    async fn handle(&self, request: AgentRequest) -> Result<OperationOutput, AgentError>;
}

/// Renders the body written after a successful login/refresh handshake.
#[async_trait]
pub trait AuthenticationSuccessHandler: Send + Sync {
    /// Produces the success body; may append response headers.
    async fn on_success(
        &self,
        token: &SsoAuthentication,
        response: &mut ResponseContext,
    ) -> Result<String, AgentError>;
}

/// Renders the body written after a failed login/refresh handshake.
#[async_trait]
pub trait AuthenticationFailureHandler: Send + Sync {
    /// Produces the failure body for a translated error.
    async fn on_failure(&self, error: &AuthError) -> Result<String, AgentError>;
}

/// Default success handler: a minimal JSON acknowledgment.
pub struct JsonSuccessHandler;

#[async_trait]
impl AuthenticationSuccessHandler for JsonSuccessHandler {
    async fn on_success(
        &self,
        token: &SsoAuthentication,
        _response: &mut ResponseContext,
    ) -> Result<String, AgentError> {
        let body = json!({
            "result": true,
            "userId": token.name().unwrap_or_default(),
        });
        Ok(serde_json::to_string(&body)?)
    }
}

/// Default failure handler: the agent's failure envelope with the
/// translated error code.
pub struct EnvelopeFailureHandler;

#[async_trait]
impl AuthenticationFailureHandler for EnvelopeFailureHandler {
    async fn on_failure(&self, error: &AuthError) -> Result<String, AgentError> {
        Ok(serde_json::to_string(&AgentErrorBody::from_auth(error))?)
    }
}

#[derive(Serialize)]
struct CheckSuccessBody<'a> {
    result: bool,
    #[serde(rename = "authStatus")]
    auth_status: AuthnState,
    #[serde(flatten)]
    user: &'a UserRecord,
}

#[derive(Serialize)]
struct CheckFailureBody {
    result: bool,
    #[serde(rename = "authStatus")]
    auth_status: AuthnState,
    #[serde(rename = "errorCode")]
    error_code: i32,
    #[serde(rename = "errorMessage")]
    error_message: String,
}

/// Session check: validates the request's session and returns the user
/// record, or the first-visit envelope when there is none.
pub struct CheckOperation {
    backend: Arc<dyn SsoBackend>,
}

impl CheckOperation {
    /// Creates the operation.
    pub fn new(backend: Arc<dyn SsoBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AgentOperation for CheckOperation {
    async fn handle(&self, request: AgentRequest) -> Result<OperationOutput, AgentError> {
        let decorated = DecoratedRequest::new(request)
            .with_agent_kind()
            .with_operation(AuthnOperation::Check);
        let mut context = ResponseContext::new();

        let status = self.backend.authenticate(&decorated, &mut context).await?;
        if status.is_success() {
            let user = self.backend.fetch_user(&decorated, &mut context).await?;
            return OperationOutput::json_with(
                &CheckSuccessBody {
                    result: true,
                    auth_status: AuthnState::SsoSuccess,
                    user: &user,
                },
                context,
            );
        }

        let error_message = if status.message.is_empty() {
            "unauthenticated request".to_string()
        } else {
            status.message.clone()
        };
        OperationOutput::json_with(
            &CheckFailureBody {
                result: false,
                auth_status: AuthnState::SsoFirst,
                error_code: status.code,
                error_message,
            },
            context,
        )
    }
}

/// Agent configuration: relays the backend's configuration document.
pub struct ConfigOperation {
    backend: Arc<dyn SsoBackend>,
}

impl ConfigOperation {
    /// Creates the operation.
    pub fn new(backend: Arc<dyn SsoBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AgentOperation for ConfigOperation {
    async fn handle(&self, request: AgentRequest) -> Result<OperationOutput, AgentError> {
        let decorated = DecoratedRequest::new(request).with_agent_kind();
        let mut context = ResponseContext::new();
        let config = self.backend.fetch_config(&decorated, &mut context).await?;
        OperationOutput::json_with(&config, context)
    }
}

/// Duplicate-session lookup. A backend-reported failure renders as that
/// failure's envelope instead of bubbling to the dispatch boundary.
pub struct DuplicateOperation {
    backend: Arc<dyn SsoBackend>,
}

impl DuplicateOperation {
    /// Creates the operation.
    pub fn new(backend: Arc<dyn SsoBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AgentOperation for DuplicateOperation {
    async fn handle(&self, request: AgentRequest) -> Result<OperationOutput, AgentError> {
        let decorated = DecoratedRequest::new(request).with_agent_kind();
        let mut context = ResponseContext::new();
        match self.backend.fetch_duplicates(&decorated, &mut context).await {
            Ok(payload) => OperationOutput::json_with(&payload, context),
            Err(BackendError::Status(status)) => {
                OperationOutput::json_with(&ErrorEnvelope::from(&status), context)
            }
            Err(other) => Err(other.into()),
        }
    }
}

/// Public-key fetch. The key is written as the raw body; a backend-reported
/// failure renders as that failure's envelope.
pub struct KeyOperation {
    backend: Arc<dyn SsoBackend>,
}

impl KeyOperation {
    /// Creates the operation.
    pub fn new(backend: Arc<dyn SsoBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AgentOperation for KeyOperation {
    async fn handle(&self, request: AgentRequest) -> Result<OperationOutput, AgentError> {
        let decorated = DecoratedRequest::new(request).with_agent_kind();
        let mut context = ResponseContext::new();
        match self.backend.fetch_public_key(&decorated, &mut context).await {
            Ok(key) => Ok(OperationOutput::raw(key, context)),
            Err(BackendError::Status(status)) => {
                OperationOutput::json_with(&ErrorEnvelope::from(&status), context)
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[derive(Serialize)]
struct TfaChallengeBody {
    result: bool,
    #[serde(rename = "errorCode")]
    error_code: i32,
    #[serde(rename = "tfaID")]
    tfa_id: String,
    #[serde(rename = "targetYN")]
    target_yn: bool,
    device: String,
    code: String,
    method: String,
    #[serde(rename = "timeoutMinutes")]
    timeout_minutes: u32,
}

/// Multi-factor challenge lookup.
pub struct TfaOperation {
    backend: Arc<dyn SsoBackend>,
}

impl TfaOperation {
    /// Creates the operation.
    pub fn new(backend: Arc<dyn SsoBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AgentOperation for TfaOperation {
    async fn handle(&self, request: AgentRequest) -> Result<OperationOutput, AgentError> {
        let decorated = DecoratedRequest::new(request).with_agent_kind();
        let mut context = ResponseContext::new();
        match self
            .backend
            .fetch_mfa_challenge(&decorated, &mut context)
            .await?
        {
            MfaOutcome::Challenge(challenge) => OperationOutput::json_with(
                &TfaChallengeBody {
                    result: true,
                    error_code: 0,
                    tfa_id: challenge.id,
                    target_yn: true,
                    device: challenge.device,
                    code: String::new(),
                    method: challenge.method,
                    timeout_minutes: challenge.timeout_minutes,
                },
                context,
            ),
            MfaOutcome::Unavailable(status) => {
                OperationOutput::json_with(&ErrorEnvelope::from(&status), context)
            }
        }
    }
}

/// Login / refresh: runs the handshake and hands the outcome to the
/// configured success or failure handler.
pub struct SignOnOperation {
    service: Arc<AuthenticationService>,
    operation: AuthnOperation,
    success: Arc<dyn AuthenticationSuccessHandler>,
    failure: Arc<dyn AuthenticationFailureHandler>,
}

impl SignOnOperation {
    /// Login operation with the default handlers.
    pub fn login(service: Arc<AuthenticationService>) -> Self {
        Self::with_handlers(
            service,
            AuthnOperation::Login,
            Arc::new(JsonSuccessHandler),
            Arc::new(EnvelopeFailureHandler),
        )
    }

    /// Refresh operation with the default handlers.
    pub fn refresh(service: Arc<AuthenticationService>) -> Self {
        Self::with_handlers(
            service,
            AuthnOperation::Refresh,
            Arc::new(JsonSuccessHandler),
            Arc::new(EnvelopeFailureHandler),
        )
    }

    /// Fully customized sign-on operation.
    pub fn with_handlers(
        service: Arc<AuthenticationService>,
        operation: AuthnOperation,
        success: Arc<dyn AuthenticationSuccessHandler>,
        failure: Arc<dyn AuthenticationFailureHandler>,
    ) -> Self {
        Self {
            service,
            operation,
            success,
            failure,
        }
    }
}

#[async_trait]
impl AgentOperation for SignOnOperation {
    async fn handle(&self, request: AgentRequest) -> Result<OperationOutput, AgentError> {
        let attempt = SsoAuthentication::unauthenticated(request);
        match self.service.authenticate(attempt, self.operation).await {
            Ok((token, mut context)) => {
                let body = self.success.on_success(&token, &mut context).await?;
                Ok(OperationOutput::raw(body, context))
            }
            Err(error) => {
                debug!(code = %error.code(), "sign-on rejected");
                let body = self.failure.on_failure(&error).await?;
                Ok(OperationOutput::raw(body, ResponseContext::new()))
            }
        }
    }
}

/// Logout: best-effort backend signal plus a neutral acknowledgment.
pub struct LogoutOperation {
    orchestrator: Arc<LogoutOrchestrator>,
}

impl LogoutOperation {
    /// Creates the operation.
    pub fn new(orchestrator: Arc<LogoutOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl AgentOperation for LogoutOperation {
    async fn handle(&self, request: AgentRequest) -> Result<OperationOutput, AgentError> {
        let context = self.orchestrator.logout(request).await;
        OperationOutput::json_with(&json!({ "result": true }), context)
    }
}
