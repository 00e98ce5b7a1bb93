//! # Core Configuration Module
//!
//! Builder-based configuration for the re-sequencing core.
//!
//! ## Overview
//!
//! `CoreConfig` holds the host capabilities the core needs and the tunables of
//! the remote client and sort strategies. Validation is fail-fast: `build()`
//! rejects a configuration that is missing a required capability or carries
//! out-of-range settings.
//!
//! ## Required Capabilities
//!
//! - `ConfirmationPrompt` - yes/no gate before destructive overwrites
//! - `HttpClient` - injected by default when the `desktop-shims` feature is
//!   enabled (reqwest)
//!
//! The bearer-token source is not part of this config; it is handed to the
//! controller directly so `core-auth` can publish on the event bus.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, LoadOrder};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .http_client(Arc::new(MyHttpClient))
//!     .confirmation_prompt(Arc::new(MyPrompt))
//!     .load_order(LoadOrder::Original)
//!     .hook_len(8)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{ConfirmationPrompt, HttpClient};
use std::sync::Arc;

/// Production Web API base.
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Description attached to playlists created by a commit.
pub const DEFAULT_PLAYLIST_DESCRIPTION: &str = "Sorted with Spoti Sort";

/// Order applied to a freshly loaded playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadOrder {
    /// Keep the order returned by the service.
    Original,
    /// Column sort on popularity, descending.
    #[default]
    PopularityDesc,
}

/// Backoff tunables for one class of transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSettings {
    /// Upper bound for the shared backoff after a retry in this class.
    pub cap_ms: u64,
    /// Random jitter is drawn from `[0, jitter_ms)`.
    pub jitter_ms: u64,
}

/// Retry budget and per-class backoff for the remote client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    /// Retries after the first attempt (total requests = `max_retries + 1`).
    pub max_retries: u32,
    /// Starting value of the shared backoff.
    pub base_delay_ms: u64,
    /// Transport failures (no HTTP status).
    pub network: BackoffSettings,
    /// HTTP 500/502/503/504.
    pub server: BackoffSettings,
    /// HTTP 429.
    pub rate_limit: BackoffSettings,
    /// Lower clamp for 429 waits, applied before jitter.
    pub rate_limit_floor_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 750,
            network: BackoffSettings {
                cap_ms: 15_000,
                jitter_ms: 250,
            },
            server: BackoffSettings {
                cap_ms: 15_000,
                jitter_ms: 400,
            },
            rate_limit: BackoffSettings {
                cap_ms: 30_000,
                jitter_ms: 400,
            },
            rate_limit_floor_ms: 1_000,
        }
    }
}

impl RetrySettings {
    fn validate(&self) -> Result<()> {
        if self.base_delay_ms == 0 {
            return Err(Error::Config(
                "Retry base delay must be greater than zero".to_string(),
            ));
        }

        for (class, backoff) in [
            ("network", &self.network),
            ("server", &self.server),
            ("rate_limit", &self.rate_limit),
        ] {
            if backoff.cap_ms < self.base_delay_ms {
                return Err(Error::Config(format!(
                    "Retry cap for {} ({}ms) is below the base delay ({}ms)",
                    class, backoff.cap_ms, self.base_delay_ms
                )));
            }
        }

        if self.rate_limit_floor_ms > self.rate_limit.cap_ms {
            return Err(Error::Config(format!(
                "Rate-limit floor ({}ms) exceeds its cap ({}ms)",
                self.rate_limit_floor_ms, self.rate_limit.cap_ms
            )));
        }

        Ok(())
    }
}

/// Parameters of the weighted interleave ("smart") sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartSortSettings {
    /// Length of the hook prefix drawn preferentially from the top bucket.
    pub hook_len: usize,
    /// Size of the recent-artist window.
    pub cooldown: usize,
}

impl Default for SmartSortSettings {
    fn default() -> Self {
        Self {
            hook_len: 5,
            cooldown: 2,
        }
    }
}

/// Settings for playlists created by commit-as-new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSettings {
    pub description: String,
    pub public: bool,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            description: DEFAULT_PLAYLIST_DESCRIPTION.to_string(),
            public: false,
        }
    }
}

/// Main configuration structure for the re-sequencing core.
#[derive(Clone)]
pub struct CoreConfig {
    /// HTTP transport (single attempt per request)
    pub http_client: Arc<dyn HttpClient>,
    /// Gate consulted before overwriting a playlist
    pub confirmation_prompt: Arc<dyn ConfirmationPrompt>,
    /// Web API base URL, without trailing slash
    pub api_base_url: String,
    pub retry: RetrySettings,
    pub smart_sort: SmartSortSettings,
    pub load_order: LoadOrder,
    pub playlist: PlaylistSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("http_client", &"HttpClient { ... }")
            .field("confirmation_prompt", &"ConfirmationPrompt { ... }")
            .field("api_base_url", &self.api_base_url)
            .field("retry", &self.retry)
            .field("smart_sort", &self.smart_sort)
            .field("load_order", &self.load_order)
            .field("playlist", &self.playlist)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "API base URL must be absolute, got '{}'",
                self.api_base_url
            )));
        }

        if self.smart_sort.cooldown == 0 {
            return Err(Error::Config(
                "Smart sort cooldown must be at least 1".to_string(),
            ));
        }

        self.retry.validate()
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| Error::CapabilityInit {
        capability: "HttpClient".to_string(),
        message: e.to_string(),
    })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for Web API access. \
                  Desktop: enable the 'desktop-shims' feature to use the default reqwest client. \
                  Other hosts: inject a platform HTTP transport."
            .to_string(),
    })
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    confirmation_prompt: Option<Arc<dyn ConfirmationPrompt>>,
    api_base_url: Option<String>,
    retry: Option<RetrySettings>,
    smart_sort: SmartSortSettings,
    load_order: LoadOrder,
    playlist: PlaylistSettings,
}

impl CoreConfigBuilder {
    /// Sets the HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the overwrite confirmation gate (required).
    pub fn confirmation_prompt(mut self, prompt: Arc<dyn ConfirmationPrompt>) -> Self {
        self.confirmation_prompt = Some(prompt);
        self
    }

    /// Overrides the Web API base URL. A trailing slash is dropped.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    pub fn retry(mut self, retry: RetrySettings) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Retries after the first attempt.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.retry.get_or_insert_with(RetrySettings::default).max_retries = max_retries;
        self
    }

    pub fn hook_len(mut self, hook_len: usize) -> Self {
        self.smart_sort.hook_len = hook_len;
        self
    }

    pub fn cooldown(mut self, cooldown: usize) -> Self {
        self.smart_sort.cooldown = cooldown;
        self
    }

    pub fn load_order(mut self, order: LoadOrder) -> Self {
        self.load_order = order;
        self
    }

    pub fn playlist_description(mut self, description: impl Into<String>) -> Self {
        self.playlist.description = description.into();
        self
    }

    pub fn public_playlists(mut self, public: bool) -> Self {
        self.playlist.public = public;
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Returns an error with an actionable message if a capability is missing
    /// or a setting is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let confirmation_prompt =
            self.confirmation_prompt
                .ok_or_else(|| Error::CapabilityMissing {
                    capability: "ConfirmationPrompt".to_string(),
                    message: "A ConfirmationPrompt is required before playlists can be overwritten. \
                              Use .confirmation_prompt() to set it."
                        .to_string(),
                })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let config = CoreConfig {
            http_client,
            confirmation_prompt,
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            retry: self.retry.unwrap_or_default(),
            smart_sort: self.smart_sort,
            load_order: self.load_order,
            playlist: self.playlist,
        };

        config.validate()?;

        Ok(config)
    }
}
