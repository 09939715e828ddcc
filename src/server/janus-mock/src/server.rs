//! Simulator HTTP surface.
//!
//! Three endpoints implementing the backend's external contract:
//! `logonService` verifies credentials against the local directory and
//! issues the identity cookie, `checkService` validates it, and
//! `logoffService` clears it.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::routing::post;
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use janus_backend::request::param;
use janus_backend::{AuthnState, DirectoryError, UserDirectory};

use crate::codec::{decode_username, encode_username, session_token, MOCK_COOKIE};
use crate::directory::verify_password;

/// Path of the logon endpoint, relative to the simulator mount point.
pub const LOGON_PATH: &str = "/logonService";
/// Path of the session-check endpoint.
pub const CHECK_PATH: &str = "/checkService";
/// Path of the logoff endpoint.
pub const LOGOFF_PATH: &str = "/logoffService";

/// Policy version echoed by every logon response.
const POLICY_VERSION: &str = "456";
/// Fixed ESSO path advertised on successful logon.
const PATH_ESSO: &str = "https://localhost:57291/";

/// Missing-parameter codes, one per required logon field so tests can
/// target a specific missing field.
fn missing_param_code(name: &str) -> i32 {
    match name {
        param::SITE_ID => 10000005,
        param::USERNAME => 10000006,
        param::PASSWORD => 10000007,
        param::RETURN_URL => 10000008,
        param::CRED_TYPE => 10000009,
        _ => 10000001,
    }
}

/// Builds the simulator router; nest it under the simulator mount point.
pub fn router(directory: Arc<dyn UserDirectory>) -> Router {
    Router::new()
        .route(LOGON_PATH, post(logon))
        .route(CHECK_PATH, post(check))
        .route(LOGOFF_PATH, post(logoff))
        .with_state(directory)
}

#[derive(Debug, Deserialize)]
struct LogonForm {
    username: Option<String>,
    password: Option<String>,
    ssosite: Option<String>,
    #[serde(rename = "returnUrl")]
    return_url: Option<String>,
    #[serde(rename = "credType")]
    cred_type: Option<String>,
}

/// Body of a logon response. Absent fields are omitted, not null.
#[derive(Debug, Serialize)]
pub struct LogonResponse {
    /// Whether the logon succeeded.
    pub result: bool,
    /// 0 on success, failure code otherwise.
    #[serde(rename = "errorCode")]
    pub error_code: i32,
    /// Failure message, empty on success.
    #[serde(rename = "errorMessage")]
    pub error_message: String,
    /// Policy version echoed to the agent.
    #[serde(rename = "policyVersion")]
    pub policy_version: String,
    /// ESSO path, present on success.
    #[serde(rename = "pathESSO", skip_serializing_if = "Option::is_none")]
    pub path_esso: Option<String>,
    /// Encoded identity, present on success.
    #[serde(rename = "ssoResponse", skip_serializing_if = "Option::is_none")]
    pub sso_response: Option<String>,
    /// Artifact handle, present on success.
    #[serde(rename = "artifactESSO", skip_serializing_if = "Option::is_none")]
    pub artifact_esso: Option<String>,
}

impl LogonResponse {
    fn success(sso_response: String) -> Self {
        Self {
            result: true,
            error_code: 0,
            error_message: String::new(),
            policy_version: POLICY_VERSION.to_string(),
            path_esso: Some(PATH_ESSO.to_string()),
            sso_response: Some(sso_response),
            artifact_esso: Some(Uuid::new_v4().to_string()),
        }
    }

    fn failure(error_code: i32, error_message: String) -> Self {
        Self {
            result: false,
            error_code,
            error_message,
            policy_version: POLICY_VERSION.to_string(),
            path_esso: None,
            sso_response: None,
            artifact_esso: None,
        }
    }
}

/// Body of a session-check response. Absent fields are omitted, not null.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    /// Whether a session exists.
    pub result: bool,
    /// `SSO_SUCCESS` or `SSO_FIRST`.
    #[serde(rename = "authStatus")]
    pub auth_status: AuthnState,
    /// Failure code, present on failure.
    #[serde(rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
    /// Failure message, present on failure.
    #[serde(rename = "errorMessage", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Session user, present on success.
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Session user attributes, present on success.
    #[serde(rename = "userAttribute", skip_serializing_if = "Option::is_none")]
    pub user_attribute: Option<Map<String, Value>>,
    /// Fresh opaque session token, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Body of a logoff response.
#[derive(Debug, Serialize)]
pub struct LogoffResponse {
    /// Always `true`; logoff is unconditional.
    pub result: bool,
}

async fn logon(
    State(directory): State<Arc<dyn UserDirectory>>,
    jar: CookieJar,
    Form(form): Form<LogonForm>,
) -> (CookieJar, Json<LogonResponse>) {
    match process_logon(directory.as_ref(), &form).await {
        Ok(username) => {
            let encoded = encode_username(&username);
            let cookie = Cookie::build((MOCK_COOKIE, encoded.clone()))
                .path("/")
                .http_only(true)
                .build();
            info!(user = %username, "mock logon accepted");
            (jar.add(cookie), Json(LogonResponse::success(encoded)))
        }
        Err((error_code, error_message)) => {
            debug!(error_code, %error_message, "mock logon rejected");
            (jar, Json(LogonResponse::failure(error_code, error_message)))
        }
    }
}

async fn process_logon(
    directory: &dyn UserDirectory,
    form: &LogonForm,
) -> Result<String, (i32, String)> {
    let username = required(&form.username, param::USERNAME)?;
    let password = required(&form.password, param::PASSWORD)?;
    required(&form.ssosite, param::SITE_ID)?;
    required(&form.return_url, param::RETURN_URL)?;
    required(&form.cred_type, param::CRED_TYPE)?;

    let user = directory
        .load_user(username)
        .await
        .map_err(|error| match error {
            DirectoryError::NotFound(_) => (11020003, error.to_string()),
            other => (1, other.to_string()),
        })?;

    if !verify_password(password, &user.password) {
        return Err((11020004, format!("bad credentials: {username}")));
    }
    Ok(user.username)
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, (i32, String)> {
    value
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            (
                missing_param_code(name),
                format!("missing required parameter: {name}"),
            )
        })
}

async fn check(jar: CookieJar) -> Json<CheckResponse> {
    let username = jar
        .get(MOCK_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .and_then(|value| decode_username(&value));

    let response = match username {
        Some(user_id) => CheckResponse {
            result: true,
            auth_status: AuthnState::SsoSuccess,
            error_code: None,
            error_message: None,
            user_id: Some(user_id),
            user_attribute: Some(Map::new()),
            token: Some(session_token()),
        },
        None => CheckResponse {
            result: false,
            auth_status: AuthnState::SsoFirst,
            error_code: Some(50000000),
            error_message: Some("unauthenticated request".to_string()),
            user_id: None,
            user_attribute: None,
            token: None,
        },
    };
    Json(response)
}

async fn logoff(jar: CookieJar) -> (CookieJar, Json<LogoffResponse>) {
    info!("mock logoff, clearing identity cookie");
    let removal = Cookie::build((MOCK_COOKIE, "")).path("/").build();
    (jar.remove(removal), Json(LogoffResponse { result: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryUserDirectory;
    use axum::body::Body;
    use http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
    use http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use janus_backend::DirectoryUser;
    use tower::ServiceExt;

    fn app() -> Router {
        let directory = InMemoryUserDirectory::new()
            .with_user(DirectoryUser::new("alice", "p"))
            .with_user(DirectoryUser::new("guest", ""));
        router(Arc::new(directory))
    }

    fn logon_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(LOGON_PATH)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn logon_success_issues_encoded_identity() {
        let response = app()
            .oneshot(logon_request(
                "username=alice&password=p&ssosite=s&returnUrl=%2Fr&credType=c",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .expect("logon must set the identity cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with(&format!("{MOCK_COOKIE}=")));

        let body = body_json(response).await;
        assert_eq!(body["result"], true);
        assert_eq!(body["errorCode"], 0);
        assert_eq!(body["ssoResponse"], encode_username("alice"));
        assert_eq!(body["policyVersion"], "456");
        assert!(body["artifactESSO"].is_string());
    }

    #[tokio::test]
    async fn logon_missing_parameters_have_stable_codes() {
        let cases = [
            ("password=p&ssosite=s&returnUrl=%2Fr&credType=c", 10000006),
            ("username=alice&ssosite=s&returnUrl=%2Fr&credType=c", 10000007),
            ("username=alice&password=p&returnUrl=%2Fr&credType=c", 10000005),
            ("username=alice&password=p&ssosite=s&credType=c", 10000008),
            ("username=alice&password=p&ssosite=s&returnUrl=%2Fr", 10000009),
        ];

        for (form, expected_code) in cases {
            let response = app().oneshot(logon_request(form)).await.unwrap();
            let body = body_json(response).await;
            assert_eq!(body["result"], false, "form: {form}");
            assert_eq!(body["errorCode"], expected_code, "form: {form}");
            assert_eq!(body["policyVersion"], "456");
        }
    }

    #[tokio::test]
    async fn logon_unknown_user_and_bad_password() {
        let response = app()
            .oneshot(logon_request(
                "username=bob&password=p&ssosite=s&returnUrl=%2Fr&credType=c",
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["errorCode"], 11020003);

        let response = app()
            .oneshot(logon_request(
                "username=alice&password=wrong&ssosite=s&returnUrl=%2Fr&credType=c",
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["errorCode"], 11020004);
    }

    #[tokio::test]
    async fn empty_stored_credential_accepts_any_password() {
        let response = app()
            .oneshot(logon_request(
                "username=guest&password=anything&ssosite=s&returnUrl=%2Fr&credType=c",
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["result"], true);
    }

    #[tokio::test]
    async fn check_reads_the_identity_cookie() {
        let request = Request::builder()
            .method(Method::POST)
            .uri(CHECK_PATH)
            .header(
                COOKIE,
                format!("{MOCK_COOKIE}={}", encode_username("alice")),
            )
            .body(Body::empty())
            .unwrap();

        let body = body_json(app().oneshot(request).await.unwrap()).await;
        assert_eq!(body["result"], true);
        assert_eq!(body["authStatus"], "SSO_SUCCESS");
        assert_eq!(body["userId"], "alice");
        assert!(body["token"].is_string());
    }

    #[tokio::test]
    async fn check_without_cookie_is_first_visit() {
        let request = Request::builder()
            .method(Method::POST)
            .uri(CHECK_PATH)
            .body(Body::empty())
            .unwrap();

        let body = body_json(app().oneshot(request).await.unwrap()).await;
        assert_eq!(body["result"], false);
        assert_eq!(body["authStatus"], "SSO_FIRST");
        assert_eq!(body["errorCode"], 50000000);
    }

    #[tokio::test]
    async fn logoff_always_succeeds_and_clears() {
        let request = Request::builder()
            .method(Method::POST)
            .uri(LOGOFF_PATH)
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .expect("logoff must clear the identity cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.contains("Max-Age=0"));

        let body = body_json(response).await;
        assert_eq!(body["result"], true);
    }
}
