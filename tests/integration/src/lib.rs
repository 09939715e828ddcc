//! Integration tests for the Janus server.
//!
//! Each test boots the dev-mode application on an ephemeral port and
//! drives it over real HTTP: simulator logon/check/logoff, the agent
//! operations in front of them, and the pass-through path.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::task::JoinHandle;

use janus_backend::BackendHandle;
use janus_server::{build_dev_app, AppConfig};

// ============================================================================
// Test Server
// ============================================================================

/// An in-process server instance bound to an ephemeral port.
pub struct TestServer {
    /// Base URL of the running server.
    pub base_url: String,
    task: JoinHandle<()>,
    _handle: BackendHandle,
}

impl TestServer {
    /// Starts the dev-mode application and waits until it accepts
    /// connections.
    pub async fn start() -> Result<Self> {
        let (app, handle) = build_dev_app(&AppConfig::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let task = tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, app).await {
                eprintln!("test server exited: {error}");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            task,
            _handle: handle,
        })
    }

    /// A client with a cookie store, so identity cookies flow between
    /// calls the way a browser would carry them.
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client")
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use janus_mock::encode_username;
    use serde_json::Value;

    const LOGON_FORM: [(&str, &str); 5] = [
        ("username", "alice"),
        ("password", "password"),
        ("ssosite", "janus-mock"),
        ("returnUrl", "/"),
        ("credType", "BASIC"),
    ];

    async fn logon(server: &TestServer, client: &Client) -> Value {
        client
            .post(server.url("/sso/server/logonService"))
            .form(&LOGON_FORM)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn simulator_logon_check_logoff_cycle() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        let logon_body = logon(&server, &client).await;
        assert_eq!(logon_body["result"], true);
        assert_eq!(logon_body["ssoResponse"], encode_username("alice"));
        assert_eq!(logon_body["policyVersion"], "456");
        assert!(logon_body["artifactESSO"].is_string());

        let check: Value = client
            .post(server.url("/sso/server/checkService"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(check["result"], true);
        assert_eq!(check["authStatus"], "SSO_SUCCESS");
        assert_eq!(check["userId"], "alice");

        let logoff: Value = client
            .post(server.url("/sso/server/logoffService"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(logoff["result"], true);

        let after: Value = client
            .post(server.url("/sso/server/checkService"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(after["result"], false);
        assert_eq!(after["authStatus"], "SSO_FIRST");
    }

    #[tokio::test]
    async fn simulator_rejects_unknown_user_and_bad_password() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        let body: Value = client
            .post(server.url("/sso/server/logonService"))
            .form(&[
                ("username", "nobody"),
                ("password", "x"),
                ("ssosite", "s"),
                ("returnUrl", "/"),
                ("credType", "BASIC"),
            ])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["result"], false);
        assert_eq!(body["errorCode"], 11020003);

        let body: Value = client
            .post(server.url("/sso/server/logonService"))
            .form(&[
                ("username", "alice"),
                ("password", "wrong"),
                ("ssosite", "s"),
                ("returnUrl", "/"),
                ("credType", "BASIC"),
            ])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["errorCode"], 11020004);
    }

    #[tokio::test]
    async fn agent_check_sees_the_simulator_session() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();
        logon(&server, &client).await;

        let check: Value = client
            .post(server.url("/sso/check"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(check["result"], true);
        assert_eq!(check["authStatus"], "SSO_SUCCESS");
        assert_eq!(check["userId"], "alice");
        assert!(check["token"].is_string());
    }

    #[tokio::test]
    async fn agent_login_accepts_the_issued_sso_response() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        let login: Value = client
            .post(server.url("/sso/login"))
            .form(&[
                ("op", "LI"),
                ("ssosite", "janus-mock"),
                ("ssoResponse", &encode_username("alice")),
                ("policyVersion", "456"),
            ])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(login["result"], true);
        assert_eq!(login["userId"], "alice");

        // The login issued the identity cookie; a session check now holds.
        let check: Value = client
            .post(server.url("/sso/check"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(check["result"], true);
        assert_eq!(check["userId"], "alice");
    }

    #[tokio::test]
    async fn agent_config_points_at_the_simulator() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        let config: Value = client
            .post(server.url("/sso/config"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(config["ssosite"], "janus-mock");
        assert_eq!(config["urlSSOLogonService"], "/sso/server/logonService");
        assert_eq!(config["urlSSOCheckService"], "/sso/server/checkService");
        assert_eq!(config["urlSSOLogoffService"], "/sso/server/logoffService");
    }

    #[tokio::test]
    async fn agent_logout_is_idempotent() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();
        logon(&server, &client).await;

        for _ in 0..2 {
            let logout: Value = client
                .post(server.url("/sso/logout"))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(logout["result"], true);
        }

        let check: Value = client
            .post(server.url("/sso/check"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(check["result"], false);
        assert_eq!(check["authStatus"], "SSO_FIRST");
    }

    #[tokio::test]
    async fn not_implemented_operations_answer_with_envelopes() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        for path in ["/sso/tfa", "/sso/key", "/sso/duplication"] {
            let body: Value = client
                .post(server.url(path))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(body["result"], false, "path: {path}");
            assert_eq!(body["errorCode"], 50000000, "path: {path}");
        }
    }

    #[tokio::test]
    async fn unrelated_paths_pass_through_the_agent() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        let response = client
            .post(server.url("/unrelated/path"))
            .send()
            .await
            .unwrap();
        // Nothing in the agent answered; the fallback of the inner router did.
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }
}
