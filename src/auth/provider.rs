//! Identity provider seam. The API never stores credentials; sign-up, sign-in
//! and refresh are forwarded to GoTrue (`{SUPABASE_URL}/auth/v1`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::gateway::postgrest::with_trailing_slash;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Token pair returned by sign-in and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered and refused (bad credentials, revoked refresh token, ...).
    #[error("Rejected by identity provider ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Identity provider unreachable: {0}")]
    Transport(String),

    #[error("Identity provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected identity provider response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the provider's response body unmodified.
    async fn sign_up(&self, credentials: &Credentials) -> Result<Value, ProviderError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, ProviderError>;

    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError>;
}

#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    auth_url: Url,
    api_key: String,
    timeout: Duration,
}

impl GoTrueClient {
    pub fn new(base_url: &Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let auth_url = with_trailing_slash(base_url)
            .join("auth/v1/")
            .map_err(|e| ProviderError::Transport(format!("invalid GoTrue URL: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            auth_url,
            api_key: api_key.into(),
            timeout,
        })
    }

    async fn post(&self, path: &str, grant_type: Option<&str>, body: &Value) -> Result<Value, ProviderError> {
        let url = self
            .auth_url
            .join(path)
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let mut request = self.http.post(url).header("apikey", &self.api_key).json(body);
        if let Some(grant_type) = grant_type {
            request = request.query(&[("grant_type", grant_type)]);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        debug!(path, %status, "gotrue response");

        if !status.is_success() {
            return Err(rejection(status, &bytes));
        }

        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Value, ProviderError> {
        let body = serde_json::to_value(credentials).map_err(|e| ProviderError::Decode(e.to_string()))?;
        self.post("signup", None, &body).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, ProviderError> {
        let body = serde_json::to_value(credentials).map_err(|e| ProviderError::Decode(e.to_string()))?;
        let value = self.post("token", Some("password"), &body).await?;
        serde_json::from_value(value).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let value = self.post("token", Some("refresh_token"), &body).await?;
        serde_json::from_value(value).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// GoTrue reports errors under several keys depending on version and endpoint.
fn rejection(status: StatusCode, body: &[u8]) -> ProviderError {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    ProviderError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_prefers_description() {
        let err = rejection(
            StatusCode::BAD_REQUEST,
            br#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        match err {
            ProviderError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid login credentials");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = rejection(StatusCode::UNPROCESSABLE_ENTITY, br#"{"code":422,"msg":"User already registered"}"#);
        assert!(matches!(err, ProviderError::Rejected { ref message, .. } if message == "User already registered"));

        let err = rejection(StatusCode::BAD_GATEWAY, b"<html>");
        assert!(matches!(err, ProviderError::Rejected { ref message, .. } if message == "Bad Gateway"));
    }

    #[test]
    fn auth_url_is_under_base() {
        let base = Url::parse("http://localhost:54321").unwrap();
        let client = GoTrueClient::new(&base, "key", Duration::from_secs(1)).unwrap();
        assert_eq!(client.auth_url.as_str(), "http://localhost:54321/auth/v1/");
    }
}
