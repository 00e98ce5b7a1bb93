//! # Credential Providers
//!
//! The remote client asks a [`CredentialProvider`] for a bearer token before
//! every request. Providers refresh transparently; callers never see an
//! expired token unless the provider has no way to refresh it.

use crate::error::{AuthError, Result};
use crate::refresher::TokenRefresher;
use crate::types::OAuthTokens;
use async_trait::async_trait;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Seconds before expiry at which a token is refreshed.
pub const TOKEN_REFRESH_BUFFER_SECS: i64 = 60;

/// Source of bearer tokens for Web API calls.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a token usable right now.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotAuthenticated`] when no credential exists. Refresh
    /// failures are returned as-is.
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token, never refreshed. Useful for scripts and tests.
pub struct StaticCredentialProvider {
    token: Option<String>,
}

impl StaticCredentialProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Provider that always reports "not signed in".
    pub fn signed_out() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn access_token(&self) -> Result<String> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(AuthError::NotAuthenticated),
        }
    }
}

/// Holds the session's [`OAuthTokens`] and refreshes them near expiry.
///
/// Concurrent callers share a single refresh: the refresh lock is held for the
/// whole check-and-refresh sequence.
pub struct RefreshingCredentialProvider {
    tokens: RwLock<Option<OAuthTokens>>,
    refresh_lock: Mutex<()>,
    refresher: Arc<dyn TokenRefresher>,
    event_bus: Option<EventBus>,
    buffer_secs: i64,
}

impl RefreshingCredentialProvider {
    pub fn new(refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            tokens: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            refresher,
            event_bus: None,
            buffer_secs: TOKEN_REFRESH_BUFFER_SECS,
        }
    }

    pub fn with_tokens(self, tokens: OAuthTokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
            ..self
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn with_refresh_buffer(mut self, buffer_secs: i64) -> Self {
        self.buffer_secs = buffer_secs;
        self
    }

    /// Installs tokens obtained by the host's sign-in flow.
    pub async fn set_tokens(&self, tokens: OAuthTokens) {
        *self.tokens.write().await = Some(tokens);
    }

    /// Forgets the current tokens.
    pub async fn sign_out(&self) {
        *self.tokens.write().await = None;
        self.emit(AuthEvent::SignedOut);
        info!("Credentials cleared");
    }

    /// Snapshot of the current tokens, for host persistence.
    pub async fn current_tokens(&self) -> Option<OAuthTokens> {
        self.tokens.read().await.clone()
    }

    fn emit(&self, event: AuthEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Auth(event));
        }
    }
}

#[async_trait]
impl CredentialProvider for RefreshingCredentialProvider {
    #[instrument(skip(self))]
    async fn access_token(&self) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        let tokens = self
            .tokens
            .read()
            .await
            .clone()
            .filter(|tokens| !tokens.access_token.is_empty())
            .ok_or(AuthError::NotAuthenticated)?;

        // Without a refresh token the stored token is the best we have.
        let Some(refresh_token) = tokens.refresh_token.clone() else {
            return Ok(tokens.access_token);
        };

        if !tokens.is_expired_with_buffer(self.buffer_secs) {
            debug!("Token is valid, no refresh needed");
            return Ok(tokens.access_token);
        }

        info!("Token expired or expiring soon, refreshing");
        self.emit(AuthEvent::TokenRefreshing);

        match self.refresher.refresh(&refresh_token).await {
            Ok(fresh) => {
                let expires_at = fresh.expires_at.map(|t| t.timestamp()).unwrap_or_default();
                let access_token = fresh.access_token.clone();
                *self.tokens.write().await = Some(fresh);
                self.emit(AuthEvent::TokenRefreshed { expires_at });
                Ok(access_token)
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                self.emit(AuthEvent::AuthError {
                    message: err.to_string(),
                    recoverable: !matches!(err, AuthError::TokenRefreshFailed(_)),
                });
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use mockall::mock;

    mock! {
        Refresher {}

        #[async_trait]
        impl TokenRefresher for Refresher {
            async fn refresh(&self, refresh_token: &str) -> Result<OAuthTokens>;
        }
    }

    fn expired_tokens() -> OAuthTokens {
        OAuthTokens {
            access_token: "stale".to_string(),
            refresh_token: Some("refresh-1".to_string()),
            expires_at: Some(Utc::now() - Duration::minutes(5)),
        }
    }

    #[tokio::test]
    async fn test_static_provider() {
        assert_eq!(
            StaticCredentialProvider::new("abc").access_token().await.unwrap(),
            "abc"
        );
        assert!(matches!(
            StaticCredentialProvider::signed_out().access_token().await,
            Err(AuthError::NotAuthenticated)
        ));
        assert!(matches!(
            StaticCredentialProvider::new("").access_token().await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_no_tokens_is_not_authenticated() {
        let mut refresher = MockRefresher::new();
        refresher.expect_refresh().never();

        let provider = RefreshingCredentialProvider::new(Arc::new(refresher));
        let result = provider.access_token().await;

        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_valid_token_skips_refresh() {
        let mut refresher = MockRefresher::new();
        refresher.expect_refresh().never();

        let provider = RefreshingCredentialProvider::new(Arc::new(refresher)).with_tokens(
            OAuthTokens::new("fresh".to_string(), Some("r".to_string()), 3600),
        );

        assert_eq!(provider.access_token().await.unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_once() {
        let mut refresher = MockRefresher::new();
        refresher
            .expect_refresh()
            .withf(|token| token.to_string() == "refresh-1")
            .times(1)
            .returning(|_| {
                Ok(OAuthTokens::new(
                    "renewed".to_string(),
                    Some("refresh-1".to_string()),
                    3600,
                ))
            });

        let bus = EventBus::new(10);
        let mut events = bus.subscribe();
        let provider = RefreshingCredentialProvider::new(Arc::new(refresher))
            .with_tokens(expired_tokens())
            .with_event_bus(bus);

        assert_eq!(provider.access_token().await.unwrap(), "renewed");
        // Second call uses the stored token.
        assert_eq!(provider.access_token().await.unwrap(), "renewed");

        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::TokenRefreshing)
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::TokenRefreshed { .. })
        ));
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_token_is_returned() {
        let mut refresher = MockRefresher::new();
        refresher.expect_refresh().never();

        let provider = RefreshingCredentialProvider::new(Arc::new(refresher)).with_tokens(
            OAuthTokens {
                refresh_token: None,
                ..expired_tokens()
            },
        );

        assert_eq!(provider.access_token().await.unwrap(), "stale");
    }

    #[tokio::test]
    async fn test_refresh_failure_is_propagated() {
        let mut refresher = MockRefresher::new();
        refresher
            .expect_refresh()
            .times(1)
            .returning(|_| Err(AuthError::TokenRefreshFailed("revoked".to_string())));

        let bus = EventBus::new(10);
        let mut events = bus.subscribe();
        let provider = RefreshingCredentialProvider::new(Arc::new(refresher))
            .with_tokens(expired_tokens())
            .with_event_bus(bus);

        let result = provider.access_token().await;
        assert!(matches!(result, Err(AuthError::TokenRefreshFailed(_))));

        let _refreshing = events.recv().await.unwrap();
        assert!(matches!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::AuthError {
                recoverable: false,
                ..
            })
        ));
        // Tokens are kept so a later retry can try again.
        assert!(provider.current_tokens().await.is_some());
    }

    #[tokio::test]
    async fn test_sign_out_clears_tokens() {
        let provider = RefreshingCredentialProvider::new(Arc::new(MockRefresher::new()))
            .with_tokens(OAuthTokens::bearer("abc"));

        provider.sign_out().await;

        assert!(provider.current_tokens().await.is_none());
        assert!(matches!(
            provider.access_token().await,
            Err(AuthError::NotAuthenticated)
        ));

        provider.set_tokens(OAuthTokens::bearer("xyz")).await;
        assert_eq!(provider.access_token().await.unwrap(), "xyz");
    }
}
