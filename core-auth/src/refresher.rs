//! Refresh-token grant against the accounts service.
//!
//! The PKCE authorization flow itself happens in the host; this module only
//! exchanges a refresh token for a new access token.

use crate::error::{AuthError, Result};
use crate::types::OAuthTokens;
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Token endpoint of the Spotify accounts service.
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Exchanges a refresh token for a fresh token set.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<OAuthTokens>;
}

#[derive(Serialize)]
struct RefreshForm<'a> {
    client_id: &'a str,
    grant_type: &'a str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error_description: Option<String>,
}

/// Public-client refresh (no client secret) over the host's HTTP transport.
pub struct SpotifyTokenRefresher {
    http_client: Arc<dyn HttpClient>,
    client_id: String,
    token_url: String,
}

impl SpotifyTokenRefresher {
    pub fn new(http_client: Arc<dyn HttpClient>, client_id: impl Into<String>) -> Self {
        Self {
            http_client,
            client_id: client_id.into(),
            token_url: SPOTIFY_TOKEN_URL.to_string(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

#[async_trait]
impl TokenRefresher for SpotifyTokenRefresher {
    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<OAuthTokens> {
        let form = RefreshForm {
            client_id: &self.client_id,
            grant_type: "refresh_token",
            refresh_token,
        };
        let encoded_body = serde_urlencoded::to_string(&form)
            .map_err(|e| AuthError::Other(format!("Failed to encode token request: {}", e)))?;

        debug!("Refreshing access token");

        let request = HttpRequest::new(HttpMethod::Post, self.token_url.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Bytes::from(encoded_body));

        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            let description = response
                .json::<TokenErrorResponse>()
                .ok()
                .and_then(|body| body.error_description)
                .unwrap_or_else(|| "Token refresh failed".to_string());

            warn!(status = response.status, error = %description, "Token refresh rejected");
            return Err(AuthError::TokenRefreshFailed(description));
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))?;

        debug!(expires_in = token_response.expires_in, "Access token refreshed");

        // The accounts service may omit the refresh token; keep the old one then.
        Ok(OAuthTokens::new(
            token_response.access_token,
            token_response
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            token_response.expires_in,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::HttpResponse;
    use bridge_traits::BridgeError;
    use mockall::mock;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    #[tokio::test]
    async fn test_refresh_posts_form_and_parses_tokens() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                let body = req
                    .body
                    .as_ref()
                    .map(|b| String::from_utf8_lossy(b).to_string())
                    .unwrap_or_default();
                req.method == HttpMethod::Post
                    && req.url == SPOTIFY_TOKEN_URL
                    && body.contains("grant_type=refresh_token")
                    && body.contains("refresh_token=old-refresh")
                    && body.contains("client_id=client-123")
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"access_token":"new-access","token_type":"Bearer","expires_in":3600}"#,
                ))
            });

        let refresher = SpotifyTokenRefresher::new(Arc::new(http), "client-123");
        let tokens = refresher.refresh("old-refresh").await.unwrap();

        assert_eq!(tokens.access_token, "new-access");
        assert_eq!(tokens.refresh_token.as_deref(), Some("old-refresh"));
        assert!(!tokens.is_expired_with_buffer(60));
    }

    #[tokio::test]
    async fn test_refresh_rotated_refresh_token_is_kept() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse::new(
                200,
                r#"{"access_token":"a2","expires_in":3600,"refresh_token":"r2"}"#,
            ))
        });

        let refresher = SpotifyTokenRefresher::new(Arc::new(http), "client-123")
            .with_token_url("http://127.0.0.1/token");
        let tokens = refresher.refresh("r1").await.unwrap();

        assert_eq!(tokens.refresh_token.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_refresh_error_uses_error_description() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse::new(
                400,
                r#"{"error":"invalid_grant","error_description":"Refresh token revoked"}"#,
            ))
        });

        let refresher = SpotifyTokenRefresher::new(Arc::new(http), "client-123");
        let err = refresher.refresh("revoked").await.unwrap_err();

        assert!(matches!(err, AuthError::TokenRefreshFailed(msg) if msg == "Refresh token revoked"));
    }

    #[tokio::test]
    async fn test_refresh_transport_failure() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Network("connection reset".to_string())));

        let refresher = SpotifyTokenRefresher::new(Arc::new(http), "client-123");
        let err = refresher.refresh("r1").await.unwrap_err();

        assert!(matches!(err, AuthError::Transport(_)));
    }
}
