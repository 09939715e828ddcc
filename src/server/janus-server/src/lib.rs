//! Janus server wiring.
//!
//! Mounts the agent dispatcher astride an axum pipeline and, in dev mode,
//! the mock backend's simulator endpoints behind it. The dispatcher runs
//! as a middleware layer: requests it matches are answered here, all
//! others flow on to the inner router untouched.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http::StatusCode;
use tower_http::trace::TraceLayer;

use janus_agent::{normalize_path, AgentConfig, AgentDispatcher};
use janus_backend::{
    AgentRequest, BackendHandle, DirectoryUser, SsoBackend, UserDirectory,
};
use janus_mock::{hash_password, InMemoryUserDirectory, MockSsoBackend};

/// Largest request body the agent gate will buffer.
const MAX_AGENT_BODY: usize = 64 * 1024;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Prefix under which the agent (and the dev simulator) are mounted.
    pub path_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/sso".to_string(),
        }
    }
}

/// Middleware that pre-filters requests into the agent's scope.
///
/// The dispatcher's derived matcher decides before anything is buffered;
/// non-matching requests continue down the pipeline with their body
/// untouched.
pub async fn agent_gate(
    State(dispatcher): State<Arc<AgentDispatcher>>,
    request: Request,
    next: Next,
) -> Response {
    if !dispatcher.matches(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_AGENT_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let snapshot = AgentRequest::from_http(&parts, &bytes);
    match dispatcher.dispatch(snapshot).await {
        Some(response) => response.map(Body::from).into_response(),
        None => next.run(Request::from_parts(parts, Body::from(bytes))).await,
    }
}

/// Directory seeded for development mode.
pub fn dev_directory() -> InMemoryUserDirectory {
    InMemoryUserDirectory::new()
        .with_user(
            DirectoryUser::new("alice", hash_password("password")).with_authority("ROLE_USER"),
        )
        .with_user(DirectoryUser::new("user", ""))
}

/// Builds the dev-mode application: mock backend, seeded directory,
/// simulator endpoints and the agent gate in front.
///
/// Returns the router together with the initialized backend handle; the
/// caller owns the handle's shutdown.
pub fn build_dev_app(config: &AppConfig) -> (Router, BackendHandle) {
    build_app_with(config, dev_directory())
}

/// Builds the dev-mode application against a caller-supplied directory.
pub fn build_app_with(
    config: &AppConfig,
    directory: InMemoryUserDirectory,
) -> (Router, BackendHandle) {
    let server_prefix = normalize_path(&[config.path_prefix.as_str(), "server"]);

    let backend: Arc<dyn SsoBackend> = Arc::new(MockSsoBackend::new(&server_prefix));
    let handle = BackendHandle::initialize(backend);

    let directory: Arc<dyn UserDirectory> = Arc::new(directory);
    let agent_config = AgentConfig {
        path_prefix: config.path_prefix.clone(),
        site_id: Some("janus-mock".to_string()),
        return_url: Some("/".to_string()),
    };
    let dispatcher = Arc::new(AgentDispatcher::standard(
        &agent_config,
        handle.backend(),
        Some(Arc::clone(&directory)),
    ));

    let router = Router::new()
        .nest(&server_prefix, janus_mock::router(directory))
        .layer(middleware::from_fn_with_state(dispatcher, agent_gate))
        .layer(TraceLayer::new_for_http());

    (router, handle)
}
