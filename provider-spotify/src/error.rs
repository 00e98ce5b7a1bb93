//! Error types for the Spotify provider

use bridge_traits::error::BridgeError;
use core_auth::AuthError;
use thiserror::Error;

/// Spotify Web API errors
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// No bearer token is available. Never retried.
    #[error("Not authenticated")]
    AuthMissing,

    /// The credential provider failed to refresh the token
    #[error("Authentication failed: {0}")]
    Auth(AuthError),

    /// Transport kept failing after every retry
    #[error("Network failure after {attempts} attempts: {message}")]
    NetworkFailure { attempts: u32, message: String },

    /// HTTP 429 after every retry
    #[error("Rate limited (429). Please try again in a moment.")]
    RateLimitExceeded,

    /// HTTP 500/502/503/504 after every retry
    #[error("Spotify server error (status {status}): {message}")]
    UpstreamServerError { status: u16, message: String },

    /// Any other non-2xx response. Not retried.
    #[error("Spotify API error (status {status}): {message}")]
    UpstreamRequestError { status: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Transport error that is not a network failure (request encoding etc.)
    #[error(transparent)]
    Bridge(BridgeError),
}

impl SpotifyError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SpotifyError::RateLimitExceeded => Some(429),
            SpotifyError::UpstreamServerError { status, .. }
            | SpotifyError::UpstreamRequestError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<AuthError> for SpotifyError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::NotAuthenticated => SpotifyError::AuthMissing,
            other => SpotifyError::Auth(other),
        }
    }
}

/// Result type for Spotify operations
pub type Result<T> = std::result::Result<T, SpotifyError>;
