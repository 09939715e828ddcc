//! Request snapshot, override decoration and response buffer.
//!
//! The agent never hands the transport's request object to the backend.
//! It takes a read-only snapshot ([`AgentRequest`]) and layers overrides on
//! top of it ([`DecoratedRequest`]) so call sites can inject the signaling
//! the backend requires (client kind, operation code, site id, return URL)
//! without mutating the caller's request. Nothing is ever removed from the
//! original request, only supplemented.

use std::collections::HashMap;

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use http::request::Parts;
use http::Method;

/// Header carrying the agent client kind.
pub const AGENT_KIND_HEADER: &str = "ssoagent-type";

/// Client kind marker for single-page-application agents.
pub const AGENT_KIND_SPA: &str = "SPA";

/// Header/parameter name for the backend operation code.
pub const OP: &str = "op";

/// Backend parameter names.
///
/// These are wire constants defined by the backend protocol; they are kept
/// verbatim rather than normalized to Rust naming.
pub mod param {
    /// Username (simulator logon).
    pub const USERNAME: &str = "username";
    /// Password (simulator logon).
    pub const PASSWORD: &str = "password";
    /// Participating site identifier.
    pub const SITE_ID: &str = "ssosite";
    /// URL to return to after the handshake.
    pub const RETURN_URL: &str = "returnUrl";
    /// Credential type marker.
    pub const CRED_TYPE: &str = "credType";
    /// Encoded SSO handshake response.
    pub const SSO_RESPONSE: &str = "ssoResponse";
    /// Artifact handle, alternative to `ssoResponse`.
    pub const ARTIFACT_ID: &str = "artifactID";
    /// Policy version echoed through the handshake.
    pub const POLICY_VERSION: &str = "policyVersion";
}

/// Operation codes the agent stamps onto delegated requests.
///
/// Only the login code (`LI`) is observable in the backend's public
/// surface; the remaining codes are backend-defined constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthnOperation {
    /// Complete a login handshake.
    Login,
    /// Validate an existing session.
    Check,
    /// Terminate a session.
    Logout,
    /// Re-issue session material.
    Refresh,
}

impl AuthnOperation {
    /// Wire code for the operation.
    pub fn code(self) -> &'static str {
        match self {
            AuthnOperation::Login => "LI",
            AuthnOperation::Check => "CK",
            AuthnOperation::Logout => "LO",
            AuthnOperation::Refresh => "RT",
        }
    }
}

/// Read-only snapshot of an inbound request.
///
/// Parameters hold both the query string and, for url-encoded bodies, the
/// form fields, in arrival order.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    params: HashMap<String, Vec<String>>,
}

impl AgentRequest {
    /// Creates an empty snapshot, mainly for tests and internal callers.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            params: HashMap::new(),
        }
    }

    /// Builds a snapshot from decomposed `http` parts and a buffered body.
    ///
    /// Query-string parameters are always parsed; the body contributes
    /// parameters only when the content type is
    /// `application/x-www-form-urlencoded`.
    pub fn from_http(parts: &Parts, body: &[u8]) -> Self {
        let mut request = Self::new(parts.method.clone(), parts.uri.path());
        request.headers = parts.headers.clone();

        if let Some(query) = parts.uri.query() {
            request.extend_params(query.as_bytes());
        }

        let form_body = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        if form_body && !body.is_empty() {
            request.extend_params(body);
        }

        request
    }

    fn extend_params(&mut self, encoded: &[u8]) {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_bytes(encoded).unwrap_or_default();
        for (name, value) in pairs {
            self.params.entry(name).or_default().push(value);
        }
    }

    /// Adds a header (builder form, for tests and adapters).
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Adds a parameter value (builder form, for tests and adapters).
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of the named header, when it is valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// First value of the named parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of the named parameter.
    pub fn param_values(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(Vec::as_slice)
    }

    /// Value of the named cookie, parsed from the `Cookie` headers.
    pub fn cookie(&self, name: &str) -> Option<String> {
        for header in self.headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else { continue };
            for pair in raw.split(';') {
                let mut parts = pair.trim().splitn(2, '=');
                if parts.next() == Some(name) {
                    return parts.next().map(str::to_owned);
                }
            }
        }
        None
    }
}

/// Two-layer override view of an [`AgentRequest`].
///
/// Header and parameter lookups consult the override layer first and fall
/// back to the original request. Header names are case-insensitive by
/// construction ([`HeaderMap`]); adding a header that is already present
/// APPENDS another value rather than replacing it.
#[derive(Debug)]
pub struct DecoratedRequest {
    inner: AgentRequest,
    headers: HeaderMap,
    params: HashMap<String, Vec<String>>,
}

impl DecoratedRequest {
    /// Wraps a request snapshot with empty override layers.
    pub fn new(inner: AgentRequest) -> Self {
        Self {
            inner,
            headers: HeaderMap::new(),
            params: HashMap::new(),
        }
    }

    /// Appends an override header value.
    pub fn add_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Stamps the client-kind marker, unless the caller already supplied one.
    pub fn with_agent_kind(self) -> Self {
        if self.header(AGENT_KIND_HEADER).is_some() {
            return self;
        }
        self.add_header(
            HeaderName::from_static(AGENT_KIND_HEADER),
            HeaderValue::from_static(AGENT_KIND_SPA),
        )
    }

    /// Stamps the operation code header.
    pub fn with_operation(self, operation: AuthnOperation) -> Self {
        self.add_header(
            HeaderName::from_static(OP),
            HeaderValue::from_static(operation.code()),
        )
    }

    /// Appends an override parameter value.
    pub fn add_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Supplies a parameter only when neither layer has it yet.
    pub fn add_param_if_absent(
        self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let name = name.into();
        if self.param(&name).is_some() {
            return self;
        }
        self.add_param(name, value)
    }

    /// First value of the named header: override layer first, then original.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .or_else(|| self.inner.header(name))
    }

    /// All values of the named header from the layer that defines it.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        let overridden: Vec<&str> = self
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if !overridden.is_empty() {
            return overridden;
        }
        self.inner
            .headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// First value of the named parameter: override layer first, then original.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
            .or_else(|| self.inner.param(name))
    }

    /// All values of the named parameter from the layer that defines it.
    pub fn param_values(&self, name: &str) -> Option<&[String]> {
        self.params
            .get(name)
            .map(Vec::as_slice)
            .or_else(|| self.inner.param_values(name))
    }

    /// Value of the named cookie on the original request.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.inner.cookie(name)
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Request path.
    pub fn path(&self) -> &str {
        self.inner.path()
    }

    /// The wrapped snapshot.
    pub fn inner(&self) -> &AgentRequest {
        &self.inner
    }
}

/// Buffer of response headers produced while talking to the backend.
///
/// Backend calls may need to emit `Set-Cookie` or similar headers toward
/// the caller (session issue, session clear). The exchange collects them
/// here; the dispatcher merges them into the one response it writes.
#[derive(Debug, Default, Clone)]
pub struct ResponseContext {
    headers: HeaderMap,
}

impl ResponseContext {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a response header.
    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    /// The buffered headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether nothing was buffered.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Appends every buffered header into `target`.
    pub fn merge_into(self, target: &mut HeaderMap) {
        for (name, value) in self.headers {
            if let Some(name) = name {
                target.append(name, value);
            }
        }
    }
}
