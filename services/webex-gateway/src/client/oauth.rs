//! OAuth 2.0 authorization-code flow for Webex.
//!
//! Interactive bootstrap for operators who do not already have an access
//! token: build the authorization URL, catch the redirect on a local
//! listener, and exchange the code. Tokens are returned to the caller;
//! nothing is persisted.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, Mutex};
use tracing::info;
use uuid::Uuid;

const WEBEX_AUTH_URL: &str = "https://webexapis.com/v1/authorize";
const WEBEX_TOKEN_URL: &str = "https://webexapis.com/v1/access_token";

/// Admin read scopes needed by the bridge, plus call-history access.
const DEFAULT_SCOPE: &str = "spark:people_read spark-admin:locations_read \
     spark-admin:organizations_read spark-admin:telephony_config_read \
     spark-admin:read_call_history";

const CALLBACK_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Network error during token exchange: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Token endpoint rejected the request: {0}")]
    Exchange(String),

    #[error("Authorization callback failed: {0}")]
    Callback(String),

    #[error("Timed out waiting for the authorization callback")]
    Timeout,

    #[error("Could not bind the local callback listener: {0}")]
    Listener(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// Webex OAuth integration.
pub struct WebexOAuth {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    http: reqwest::Client,
}

impl WebexOAuth {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: "http://localhost:8080/callback".to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Authorization URL with a state parameter.
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            WEBEX_AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scope),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthTokenResponse, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        self.token_request(&params).await
    }

    /// Refresh an access token using a refresh token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<OAuthTokenResponse, OAuthError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];
        self.token_request(&params).await
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
    ) -> Result<OAuthTokenResponse, OAuthError> {
        let response = self
            .http
            .post(WEBEX_TOKEN_URL)
            .form(params)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Exchange(body.chars().take(300).collect()));
        }

        Ok(response.json().await?)
    }

    /// Complete the interactive flow: log the authorization URL, wait for
    /// the local callback, exchange the code.
    pub async fn authorize(&self, port: u16) -> Result<OAuthTokenResponse, OAuthError> {
        let state = Uuid::new_v4().to_string();
        let url = self.authorization_url(&state);
        info!(url = %url, "Open this URL in a browser to authorize the bridge");

        let code = wait_for_callback(port, CALLBACK_TIMEOUT_SECS).await?;
        self.exchange_code(&code).await
    }
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

/// Run a short-lived listener on `127.0.0.1:port` and return the first
/// authorization code delivered to `/callback`.
async fn wait_for_callback(port: u16, timeout_secs: u64) -> Result<String, OAuthError> {
    let (tx, rx) = oneshot::channel::<Result<String, String>>();
    let tx = Arc::new(Mutex::new(Some(tx)));

    let app = Router::new().route(
        "/callback",
        get(move |Query(params): Query<CallbackParams>| {
            let tx = tx.clone();
            async move {
                let outcome = match (params.code, params.error) {
                    (Some(code), _) => Ok(code),
                    (None, Some(error)) => Err(error),
                    (None, None) => Err("callback carried neither code nor error".to_string()),
                };
                let page = match &outcome {
                    Ok(_) => {
                        "<html><body><h1>Authorization successful</h1>\
                         <p>You can close this window.</p></body></html>"
                    }
                    Err(_) => {
                        "<html><body><h1>Authorization failed</h1>\
                         <p>See the service log for details.</p></body></html>"
                    }
                };
                if let Some(tx) = tx.lock().await.take() {
                    let _ = tx.send(outcome);
                }
                Html(page)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let outcome = tokio::time::timeout(Duration::from_secs(timeout_secs), rx).await;
    server.abort();

    match outcome {
        Ok(Ok(Ok(code))) => Ok(code),
        Ok(Ok(Err(error))) => Err(OAuthError::Callback(error)),
        Ok(Err(_)) => Err(OAuthError::Callback("listener closed unexpectedly".to_string())),
        Err(_) => Err(OAuthError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_encodes_parameters() {
        let oauth = WebexOAuth::new("client id", "secret")
            .with_redirect_uri("http://localhost:9000/callback")
            .with_scope("spark:people_read");
        let url = oauth.authorization_url("state-123");

        assert!(url.starts_with(WEBEX_AUTH_URL));
        assert!(url.contains("client_id=client%20id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A9000%2Fcallback"));
        assert!(url.contains("scope=spark%3Apeople_read"));
        assert!(url.contains("state=state-123"));
    }
}
