use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OAuth 2.0 token set for the signed-in user.
///
/// # Security
///
/// Tokens must never be logged. The `Debug` implementation redacts them.
///
/// # Examples
///
/// ```
/// use core_auth::OAuthTokens;
///
/// let tokens = OAuthTokens::new("BQD...".to_string(), Some("AQC...".to_string()), 3600);
/// assert!(!tokens.is_expired_with_buffer(60));
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OAuthTokens {
    /// Bearer token sent with every API request
    pub access_token: String,
    /// Long-lived token used to obtain a new access token
    pub refresh_token: Option<String>,
    /// When the access token expires (UTC); `None` when unknown
    pub expires_at: Option<DateTime<Utc>>,
}

impl OAuthTokens {
    /// Create a token set expiring `expires_in` seconds from now
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: Some(Utc::now() + Duration::seconds(expires_in)),
        }
    }

    /// Token set without expiry information, e.g. a token pasted by the user.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// `true` when the token is expired or expires within `buffer_seconds`.
    ///
    /// A token without a known expiry is never considered expired.
    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at - Duration::seconds(buffer_seconds),
            None => false,
        }
    }

    /// Time remaining until expiration, `None` if expired or unknown.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        let expires_at = self.expires_at?;
        let now = Utc::now();
        if now >= expires_at {
            None
        } else {
            Some(expires_at - now)
        }
    }
}

impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
