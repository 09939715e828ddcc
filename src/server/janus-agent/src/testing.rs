//! In-crate test double for the SSO backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use http::header::{HeaderValue, SET_COOKIE};
use serde_json::{json, Value};

use janus_backend::request::{param, OP};
use janus_backend::{
    BackendError, BackendStatus, DecoratedRequest, MfaChallenge, MfaOutcome, ResponseContext,
    SsoBackend, UserRecord,
};

enum StubMode {
    Succeed { user: String },
    Reject(BackendStatus),
    Unavailable,
}

/// Scriptable backend double with call accounting.
pub(crate) struct StubBackend {
    mode: StubMode,
    mfa: Option<MfaChallenge>,
    public_key: Option<String>,
    duplicates: Option<Value>,
    authenticate_calls: AtomicUsize,
    fetch_user_calls: AtomicUsize,
    config_calls: AtomicUsize,
    other_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    last_logout_params: Mutex<HashMap<String, String>>,
}

impl StubBackend {
    fn new(mode: StubMode) -> Self {
        Self {
            mode,
            mfa: None,
            public_key: None,
            duplicates: None,
            authenticate_calls: AtomicUsize::new(0),
            fetch_user_calls: AtomicUsize::new(0),
            config_calls: AtomicUsize::new(0),
            other_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            last_logout_params: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn succeeding(user: &str) -> Self {
        Self::new(StubMode::Succeed {
            user: user.to_string(),
        })
    }

    pub(crate) fn rejecting(status: BackendStatus) -> Self {
        Self::new(StubMode::Reject(status))
    }

    pub(crate) fn unavailable() -> Self {
        Self::new(StubMode::Unavailable)
    }

    pub(crate) fn with_mfa(mut self, challenge: MfaChallenge) -> Self {
        self.mfa = Some(challenge);
        self
    }

    pub(crate) fn with_public_key(mut self, key: &str) -> Self {
        self.public_key = Some(key.to_string());
        self
    }

    pub(crate) fn authenticate_calls(&self) -> usize {
        self.authenticate_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_user_calls(&self) -> usize {
        self.fetch_user_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn config_calls(&self) -> usize {
        self.config_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.authenticate_calls()
            + self.fetch_user_calls()
            + self.config_calls()
            + self.logout_calls()
            + self.other_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_logout_params(&self) -> HashMap<String, String> {
        self.last_logout_params.lock().unwrap().clone()
    }

    fn offline(&self) -> BackendError {
        BackendError::Unavailable("stub backend offline".to_string())
    }

    fn not_implemented() -> BackendError {
        BackendError::Status(BackendStatus::failure(50000000, "NotImplemented"))
    }
}

#[async_trait]
impl SsoBackend for StubBackend {
    async fn authenticate(
        &self,
        _request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<BackendStatus, BackendError> {
        self.authenticate_calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            StubMode::Succeed { .. } => Ok(BackendStatus::success(0, "")),
            StubMode::Reject(status) => Ok(status.clone()),
            StubMode::Unavailable => Err(self.offline()),
        }
    }

    async fn fetch_user(
        &self,
        _request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<UserRecord, BackendError> {
        self.fetch_user_calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            StubMode::Succeed { user } => Ok(UserRecord::new(user.clone())),
            StubMode::Reject(_) => Err(BackendError::Protocol("no session user".to_string())),
            StubMode::Unavailable => Err(self.offline()),
        }
    }

    async fn fetch_config(
        &self,
        _request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<Value, BackendError> {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            StubMode::Unavailable => Err(self.offline()),
            _ => Ok(json!({ "ssosite": "stub" })),
        }
    }

    async fn fetch_duplicates(
        &self,
        _request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<Value, BackendError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        match (&self.mode, &self.duplicates) {
            (StubMode::Unavailable, _) => Err(self.offline()),
            (_, Some(payload)) => Ok(payload.clone()),
            (_, None) => Err(Self::not_implemented()),
        }
    }

    async fn fetch_public_key(
        &self,
        _request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<String, BackendError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        match (&self.mode, &self.public_key) {
            (StubMode::Unavailable, _) => Err(self.offline()),
            (_, Some(key)) => Ok(key.clone()),
            (_, None) => Err(Self::not_implemented()),
        }
    }

    async fn fetch_mfa_challenge(
        &self,
        _request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<MfaOutcome, BackendError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        match (&self.mode, &self.mfa) {
            (StubMode::Unavailable, _) => Err(self.offline()),
            (_, Some(challenge)) => Ok(MfaOutcome::Challenge(challenge.clone())),
            (_, None) => Ok(MfaOutcome::Unavailable(BackendStatus::failure(
                50000000,
                "NotImplemented",
            ))),
        }
    }

    async fn logout(
        &self,
        request: &DecoratedRequest,
        response: &mut ResponseContext,
    ) -> Result<(), BackendError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);

        let mut params = HashMap::new();
        for name in [OP, param::SITE_ID, param::RETURN_URL] {
            if let Some(value) = request.param(name) {
                params.insert(name.to_string(), value.to_string());
            }
        }
        *self.last_logout_params.lock().unwrap() = params;

        match &self.mode {
            StubMode::Unavailable => Err(self.offline()),
            _ => {
                response.add_header(
                    SET_COOKIE,
                    HeaderValue::from_static("sso-mock-auth=; Max-Age=0"),
                );
                Ok(())
            }
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
