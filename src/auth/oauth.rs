use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

use super::error::AuthError;
use crate::config::OAuthSettings;
use crate::utils::{retry_on_transient, IsTransient, RetryConfig};

// ============================================================================
// OAuth2 Authorization-Code Client
// ============================================================================
//
// Two halves of the flow:
// - `authorize_url` builds the redirect target for /login
// - `OAuthClient::exchange_code` trades the callback code for a token
//
// The exchange sits behind a trait so handlers can run against a fake
// provider.
//
// ============================================================================

/// Token endpoint response (RFC 6749 §5.1)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[async_trait]
pub trait OAuthClient: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError>;
}

/// Provider authorize URL carrying the client id, redirect, scopes and `state`
pub fn authorize_url(settings: &OAuthSettings, state: &str) -> Result<Url, AuthError> {
    let scope = settings.scopes.join(" ");
    Url::parse_with_params(
        &settings.authorize_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("redirect_uri", settings.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("state", state),
            ("access_type", "offline"),
        ],
    )
    .map_err(|e| AuthError::InvalidAuthorizeUrl(e.to_string()))
}

// ============================================================================
// HTTP implementation
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum TokenError {
    #[error("request to token endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("token endpoint returned an unreadable body: {0}")]
    InvalidBody(String),
}

impl IsTransient for TokenError {
    fn is_transient(&self) -> bool {
        match self {
            TokenError::Transport(e) => e.is_timeout() || e.is_connect(),
            TokenError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            TokenError::InvalidBody(_) => false,
        }
    }
}

/// Token exchange over HTTP with `reqwest`
pub struct HttpOAuthClient {
    http: reqwest::Client,
    settings: OAuthSettings,
    retry: RetryConfig,
}

impl HttpOAuthClient {
    pub fn new(settings: OAuthSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.token_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            settings,
            retry: RetryConfig::default(),
        })
    }

    async fn request_token(&self, code: &str) -> Result<TokenResponse, TokenError> {
        let response = self
            .http
            .post(&self.settings.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.settings.redirect_url.as_str()),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::Status { status, body });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| TokenError::InvalidBody(e.to_string()))
    }
}

#[async_trait]
impl OAuthClient for HttpOAuthClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        tracing::debug!(
            provider = %self.settings.provider_name,
            token_url = %self.settings.token_url,
            "Exchanging authorization code"
        );

        retry_on_transient(self.retry.clone(), |_attempt| self.request_token(code))
            .await
            .into_result()
            .map_err(|e| AuthError::TokenExchange(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OAuthSettings {
        OAuthSettings {
            client_id: "client-123".to_string(),
            ..OAuthSettings::default()
        }
    }

    #[test]
    fn test_authorize_url_carries_parameters() {
        let url = authorize_url(&settings(), "state-abc").unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["state"], "state-abc");
        assert_eq!(params["redirect_uri"], "http://localhost:8080/callback");
        assert_eq!(params["scope"], "https://www.googleapis.com/auth/userinfo.profile");
    }

    #[test]
    fn test_authorize_url_rejects_bad_base() {
        let mut settings = settings();
        settings.authorize_url = "::not a url::".to_string();
        assert!(matches!(
            authorize_url(&settings, "s"),
            Err(AuthError::InvalidAuthorizeUrl(_))
        ));
    }

    #[test]
    fn test_status_errors_classified() {
        let server_error = TokenError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        let rejected = TokenError::Status {
            status: StatusCode::BAD_REQUEST,
            body: "invalid_grant".to_string(),
        };

        assert!(server_error.is_transient());
        assert!(!rejected.is_transient());
        assert!(!TokenError::InvalidBody("eof".into()).is_transient());
    }

    #[test]
    fn test_token_response_minimal_body() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert!(token.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint() {
        let mut settings = settings();
        settings.token_url = "http://127.0.0.1:9/token".to_string();
        settings.token_timeout_secs = 1;

        let mut client = HttpOAuthClient::new(settings).unwrap();
        client.retry = RetryConfig {
            max_attempts: 1,
            ..RetryConfig::default()
        };

        let result = client.exchange_code("code").await;
        assert!(matches!(result, Err(AuthError::TokenExchange(_))));
    }
}
