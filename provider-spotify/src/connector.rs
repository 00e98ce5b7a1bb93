//! Spotify Web API connector
//!
//! Every call goes through [`SpotifyClient::execute_with_retry`], which owns
//! authentication, retry and error mapping. Requests are issued strictly one
//! at a time.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_auth::CredentialProvider;
use core_library::models::{CreatedPlaylist, PlaylistHandle, Track, UserProfile};
use core_library::sort::collate;
use core_runtime::config::{CoreConfig, DEFAULT_API_BASE_URL};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SpotifyError};
use crate::retry::{RetryClass, RetryPolicy};
use crate::types::{
    CreatePlaylistRequest, ErrorEnvelope, Page, PlaylistObject, PlaylistTrackItem, TrackObject,
    UrisRequest, UserObject,
};

/// Maximum URIs per playlist write (Web API limit)
pub const WRITE_CHUNK_SIZE: usize = 100;

/// Page size for `/me/playlists`
const PLAYLIST_PAGE_SIZE: u32 = 50;

/// Page size for `/playlists/{id}/tracks`
const TRACK_PAGE_SIZE: u32 = 100;

/// Field filter for playlist items
const TRACK_FIELDS: &str =
    "items(track(id,name,artists(name),duration_ms,popularity,external_urls(spotify))),next,total";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spotify Web API client
///
/// # Example
///
/// ```ignore
/// use provider_spotify::SpotifyClient;
///
/// let client = SpotifyClient::from_config(&config, credentials);
/// let tracks = client.playlist_tracks("37i9dQZF1DXcBWIGoYBM5M").await?;
/// ```
pub struct SpotifyClient {
    http_client: Arc<dyn HttpClient>,
    credentials: Arc<dyn CredentialProvider>,
    /// API base without trailing slash
    base_url: String,
    retry: RetryPolicy,
}

impl SpotifyClient {
    pub fn new(http_client: Arc<dyn HttpClient>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            http_client,
            credentials,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Client using the transport, base URL and retry settings of `config`.
    pub fn from_config(config: &CoreConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self::new(config.http_client.clone(), credentials)
            .with_base_url(config.api_base_url.clone())
            .with_retry_policy(RetryPolicy::new(config.retry))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.base_url, endpoint)
        }
    }

    /// Reduces an absolute `next` link to a path relative to the API base.
    fn relative(&self, next: String) -> String {
        match next.strip_prefix(&self.base_url) {
            Some(path) => path.to_string(),
            None => next,
        }
    }

    /// Execute API request with retry logic
    ///
    /// Network failures, 429 and 500/502/503/504 are retried with the shared
    /// backoff. Any other non-2xx response fails immediately.
    #[instrument(skip(self, body))]
    async fn execute_with_retry(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<Bytes>,
    ) -> Result<HttpResponse> {
        let token = self.credentials.access_token().await?;
        let url = self.url_for(endpoint);
        let mut backoff = self.retry.start();

        loop {
            let mut request = HttpRequest::new(method, url.clone())
                .bearer_token(token.as_str())
                .header("Accept", "application/json")
                .timeout(REQUEST_TIMEOUT);

            if let Some(body) = &body {
                request = request
                    .header("Content-Type", "application/json")
                    .body(body.clone());
            }

            match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => {
                    debug!(status = response.status, "API request succeeded");
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status;
                    let Some(class) =
                        RetryClass::from_status(status, response.header("Retry-After"))
                    else {
                        let message = error_message(&response);
                        warn!(status, error = %message, "API request failed");
                        return Err(SpotifyError::UpstreamRequestError { status, message });
                    };

                    match backoff.next_delay(class) {
                        Some(delay) => {
                            warn!(
                                status,
                                attempt = backoff.attempt(),
                                max_retries = self.retry.max_retries(),
                                delay_ms = delay.as_millis() as u64,
                                "API request failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            warn!(
                                status,
                                attempts = backoff.attempt() + 1,
                                "API request failed after all retries"
                            );
                            return Err(match class {
                                RetryClass::RateLimited { .. } => SpotifyError::RateLimitExceeded,
                                _ => SpotifyError::UpstreamServerError {
                                    status,
                                    message: error_message(&response),
                                },
                            });
                        }
                    }
                }
                Err(e) if e.is_network() => match backoff.next_delay(RetryClass::Network) {
                    Some(delay) => {
                        warn!(
                            error = %e,
                            attempt = backoff.attempt(),
                            max_retries = self.retry.max_retries(),
                            delay_ms = delay.as_millis() as u64,
                            "API request failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        warn!(error = %e, "API request failed after all retries");
                        return Err(SpotifyError::NetworkFailure {
                            attempts: backoff.attempt() + 1,
                            message: e.to_string(),
                        });
                    }
                },
                Err(e) => return Err(SpotifyError::Bridge(e)),
            }
        }
    }

    /// Request with a JSON response; `None` for 204 or an empty body.
    async fn request_json<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<Bytes>,
    ) -> Result<Option<T>> {
        let response = self.execute_with_retry(method, endpoint, body).await?;

        if response.status == 204 || response.body.is_empty() {
            return Ok(None);
        }

        serde_json::from_slice(&response.body)
            .map(Some)
            .map_err(|e| SpotifyError::ParseError(format!("{}: {}", endpoint, e)))
    }

    /// Collects every item of a paginated endpoint, following `next` links.
    #[instrument(skip(self))]
    pub async fn list_paginated<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(endpoint.to_string());
        let mut pages = 0usize;

        while let Some(endpoint) = next.take() {
            let Some(page) = self
                .request_json::<Page<T>>(HttpMethod::Get, &endpoint, None)
                .await?
            else {
                break;
            };

            pages += 1;
            items.extend(page.items);
            debug!(page = pages, fetched = items.len(), total = ?page.total, "Fetched page");

            next = page.next.map(|url| self.relative(url));
        }

        Ok(items)
    }

    /// `GET /me`
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<UserProfile> {
        let user: UserObject = self
            .request_json(HttpMethod::Get, "/me", None)
            .await?
            .ok_or_else(|| SpotifyError::ParseError("/me: empty response".to_string()))?;

        Ok(user.into())
    }

    /// The user's playlists, sorted by name.
    #[instrument(skip(self))]
    pub async fn list_playlists(&self) -> Result<Vec<PlaylistHandle>> {
        let endpoint = format!("/me/playlists?limit={}", PLAYLIST_PAGE_SIZE);
        let mut playlists: Vec<PlaylistHandle> = self
            .list_paginated::<PlaylistObject>(&endpoint)
            .await?
            .into_iter()
            .map(PlaylistObject::into_handle)
            .collect();

        playlists.sort_by(|a, b| collate(&a.display_name, &b.display_name));

        info!(count = playlists.len(), "Listed playlists");
        Ok(playlists)
    }

    /// Tracks of a playlist in playlist order. Items without a track id are
    /// skipped.
    #[instrument(skip(self))]
    pub async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        let endpoint = format!(
            "/playlists/{}/tracks?limit={}&fields={}",
            urlencoding::encode(playlist_id),
            TRACK_PAGE_SIZE,
            TRACK_FIELDS
        );

        let items = self.list_paginated::<PlaylistTrackItem>(&endpoint).await?;
        let fetched = items.len();
        let tracks: Vec<Track> = items
            .into_iter()
            .filter_map(|item| item.track.and_then(TrackObject::into_track))
            .collect();

        info!(
            tracks = tracks.len(),
            skipped = fetched - tracks.len(),
            "Loaded playlist tracks"
        );
        Ok(tracks)
    }

    /// `POST /users/{user_id}/playlists`
    #[instrument(skip(self, description))]
    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist> {
        let endpoint = format!("/users/{}/playlists", urlencoding::encode(user_id));
        let body = encode_body(&CreatePlaylistRequest {
            name,
            description,
            public,
        })?;

        let playlist: PlaylistObject = self
            .request_json(HttpMethod::Post, &endpoint, Some(body))
            .await?
            .ok_or_else(|| SpotifyError::ParseError(format!("{}: empty response", endpoint)))?;

        info!(playlist_id = %playlist.id, "Created playlist");
        Ok(playlist.into_created())
    }

    /// Appends `uris` in chunks of [`WRITE_CHUNK_SIZE`], in order.
    ///
    /// Returns the number of write requests issued.
    #[instrument(skip(self, uris), fields(uris = uris.len()))]
    pub async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<usize> {
        let endpoint = items_endpoint(playlist_id);
        let mut writes = 0;

        for chunk in uris.chunks(WRITE_CHUNK_SIZE) {
            let body = encode_body(&UrisRequest { uris: chunk })?;
            self.execute_with_retry(HttpMethod::Post, &endpoint, Some(body))
                .await?;
            writes += 1;
            debug!(chunk = writes, size = chunk.len(), "Appended playlist items");
        }

        Ok(writes)
    }

    /// Replaces the playlist contents with `uris`.
    ///
    /// The first chunk replaces (`PUT`), the rest are appended. An empty list
    /// clears the playlist with a single replace.
    #[instrument(skip(self, uris), fields(uris = uris.len()))]
    pub async fn overwrite_items(&self, playlist_id: &str, uris: &[String]) -> Result<usize> {
        let split = uris.len().min(WRITE_CHUNK_SIZE);
        let (first, rest) = uris.split_at(split);

        let body = encode_body(&UrisRequest { uris: first })?;
        self.execute_with_retry(HttpMethod::Put, &items_endpoint(playlist_id), Some(body))
            .await?;
        debug!(size = first.len(), "Replaced playlist items");

        let appended = self.add_items(playlist_id, rest).await?;
        Ok(1 + appended)
    }
}

fn items_endpoint(playlist_id: &str) -> String {
    format!("/playlists/{}/tracks", urlencoding::encode(playlist_id))
}

fn encode_body<T: Serialize>(body: &T) -> Result<Bytes> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(|e| SpotifyError::ParseError(format!("Failed to encode request body: {}", e)))
}

/// `error.message` from the body, else `"<status> <reason>"`.
fn error_message(response: &HttpResponse) -> String {
    response
        .json::<ErrorEnvelope>()
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| {
            format!("{} {}", response.status, response.reason_phrase())
                .trim_end()
                .to_string()
        })
}
