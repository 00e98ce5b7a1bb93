//! # Authentication Module
//!
//! Bearer-token supply for the Web API client.
//!
//! ## Overview
//!
//! The interactive PKCE sign-in runs in the host. This crate takes over once
//! tokens exist: it hands out a valid access token on demand, refreshes it
//! shortly before expiry and publishes auth events on the core event bus.
//!
//! - [`CredentialProvider`] - trait consumed by the remote client
//! - [`RefreshingCredentialProvider`] - token store with transparent refresh
//! - [`SpotifyTokenRefresher`] - refresh-token grant over `HttpClient`

pub mod error;
pub mod provider;
pub mod refresher;
pub mod types;

pub use error::{AuthError, Result};
pub use provider::{
    CredentialProvider, RefreshingCredentialProvider, StaticCredentialProvider,
    TOKEN_REFRESH_BUFFER_SECS,
};
pub use refresher::{SpotifyTokenRefresher, TokenRefresher, SPOTIFY_TOKEN_URL};
pub use types::OAuthTokens;
