//! Mock implementation of the SSO backend contract.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum_extra::extract::cookie::Cookie;
use http::header::{HeaderValue, SET_COOKIE};
use serde_json::{json, Value};

use janus_backend::request::{param, OP};
use janus_backend::{
    AuthnOperation, BackendError, BackendStatus, DecoratedRequest, MfaOutcome, ResponseContext,
    SsoBackend, UserRecord,
};

use crate::codec::{decode_username, encode_username, session_token, MOCK_COOKIE};
use crate::server::{CHECK_PATH, LOGOFF_PATH, LOGON_PATH};

/// Drop-in backend that keeps the whole agent runnable without the real
/// SSO service.
///
/// Identity travels in the simulator's base64 cookie: a sign-on call issues
/// it, a session check decodes it, logout clears it. Never enable outside
/// development or test configuration.
pub struct MockSsoBackend {
    /// Mount point of the simulator's server endpoints, used in the
    /// configuration document.
    prefix: String,
}

impl MockSsoBackend {
    /// Creates a mock backend advertising simulator endpoints under
    /// `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn service_url(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix.trim_end_matches('/'), suffix)
    }

    fn is_sign_on(request: &DecoratedRequest) -> bool {
        matches!(
            request.header(OP),
            Some(op) if op == AuthnOperation::Login.code() || op == AuthnOperation::Refresh.code()
        )
    }

    /// Identity carried by a sign-on request.
    ///
    /// A request without the `op` form parameter switches the simulator
    /// into fixed-user mode, which keeps hand-driven tests short.
    fn sign_on_username(request: &DecoratedRequest) -> Option<String> {
        if request.param(OP).is_none() {
            return Some("user".to_string());
        }
        if let Some(username) = request.param(param::USERNAME) {
            if !username.is_empty() {
                return Some(username.to_string());
            }
        }
        request
            .param(param::SSO_RESPONSE)
            .and_then(decode_username)
    }

    /// Identity carried by an established session.
    fn session_username(request: &DecoratedRequest) -> Option<String> {
        request
            .cookie(MOCK_COOKIE)
            .as_deref()
            .and_then(decode_username)
    }

    fn current_username(request: &DecoratedRequest) -> Option<String> {
        if Self::is_sign_on(request) {
            Self::sign_on_username(request)
        } else {
            Self::session_username(request)
        }
    }

    fn set_identity_cookie(
        username: &str,
        response: &mut ResponseContext,
    ) -> Result<(), BackendError> {
        let cookie = Cookie::build((MOCK_COOKIE, encode_username(username)))
            .path("/")
            .http_only(true)
            .build();
        response.add_header(
            SET_COOKIE,
            HeaderValue::from_str(&cookie.to_string())
                .map_err(|error| BackendError::Protocol(error.to_string()))?,
        );
        Ok(())
    }

    fn not_implemented() -> BackendStatus {
        BackendStatus::failure(50000000, "NotImplemented")
    }
}

#[async_trait]
impl SsoBackend for MockSsoBackend {
    async fn authenticate(
        &self,
        request: &DecoratedRequest,
        response: &mut ResponseContext,
    ) -> Result<BackendStatus, BackendError> {
        match Self::current_username(request) {
            Some(username) => {
                if Self::is_sign_on(request) {
                    Self::set_identity_cookie(&username, response)?;
                }
                Ok(BackendStatus::success(0, ""))
            }
            None => Ok(BackendStatus::failure(50000000, "unauthenticated request")),
        }
    }

    async fn fetch_user(
        &self,
        request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<UserRecord, BackendError> {
        let username = Self::current_username(request).ok_or_else(|| {
            BackendError::Status(BackendStatus::failure(50000000, "unauthenticated request"))
        })?;

        let last_logon = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();

        let mut record = UserRecord::new(username);
        record
            .attributes
            .insert("lastLogonTime".to_string(), Value::from(last_logon));
        record.token = Some(session_token());
        Ok(record)
    }

    async fn fetch_config(
        &self,
        _request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<Value, BackendError> {
        Ok(json!({
            "ssosite": "janus-mock",
            "urlSSOLogonService": self.service_url(LOGON_PATH),
            "urlSSOLogoffService": self.service_url(LOGOFF_PATH),
            "urlSSOCheckService": self.service_url(CHECK_PATH),
            "defaultUrl": "/",
        }))
    }

    async fn fetch_duplicates(
        &self,
        _request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<Value, BackendError> {
        Err(BackendError::Status(Self::not_implemented()))
    }

    async fn fetch_public_key(
        &self,
        _request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<String, BackendError> {
        Err(BackendError::Status(Self::not_implemented()))
    }

    async fn fetch_mfa_challenge(
        &self,
        _request: &DecoratedRequest,
        _response: &mut ResponseContext,
    ) -> Result<MfaOutcome, BackendError> {
        Ok(MfaOutcome::Unavailable(Self::not_implemented()))
    }

    async fn logout(
        &self,
        _request: &DecoratedRequest,
        response: &mut ResponseContext,
    ) -> Result<(), BackendError> {
        let mut cookie = Cookie::new(MOCK_COOKIE, "");
        cookie.set_path("/");
        cookie.make_removal();
        response.add_header(
            SET_COOKIE,
            HeaderValue::from_str(&cookie.to_string())
                .map_err(|error| BackendError::Protocol(error.to_string()))?,
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "janus-mock"
    }
}
