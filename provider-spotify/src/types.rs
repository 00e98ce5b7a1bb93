//! Spotify Web API response types
//!
//! Only the fields the re-sequencing core reads are modelled. Unknown fields
//! are ignored.

use core_library::models::{Artist, CreatedPlaylist, PlaylistHandle, Track, UserProfile};
use serde::{Deserialize, Deserializer, Serialize};

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Paging object wrapping every list endpoint
///
/// See: https://developer.spotify.com/documentation/web-api/concepts/api-calls
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<T>,

    /// Absolute URL of the next page
    #[serde(default)]
    pub next: Option<String>,

    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Track object, restricted by the `fields` filter
#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artists: Vec<ArtistObject>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub popularity: Option<u8>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

impl TrackObject {
    /// Converts to a domain track; `None` when the track has no id.
    pub fn into_track(self) -> Option<Track> {
        let id = self.id.filter(|id| !id.is_empty())?;

        Some(Track {
            id,
            name: self.name,
            artists: self
                .artists
                .into_iter()
                .map(|artist| Artist::new(artist.id, artist.name))
                .collect(),
            popularity: self.popularity,
            duration_ms: self.duration_ms,
            external_url: self.external_urls.and_then(|urls| urls.spotify),
        })
    }
}

/// Entry of `GET /playlists/{id}/tracks`; `track` is null for removed items
#[derive(Debug, Deserialize)]
pub struct PlaylistTrackItem {
    #[serde(default)]
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TracksRef {
    #[serde(default)]
    pub total: Option<u32>,
}

/// Simplified playlist object
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistObject {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub tracks: Option<TracksRef>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

impl PlaylistObject {
    pub fn into_handle(self) -> PlaylistHandle {
        PlaylistHandle {
            track_total: self.tracks.and_then(|t| t.total),
            id: self.id,
            display_name: self.name,
        }
    }

    pub fn into_created(self) -> CreatedPlaylist {
        CreatedPlaylist::new(self.id, self.external_urls.and_then(|urls| urls.spotify))
    }
}

/// `GET /me`
#[derive(Debug, Deserialize)]
pub struct UserObject {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl From<UserObject> for UserProfile {
    fn from(user: UserObject) -> Self {
        UserProfile {
            id: user.id,
            display_name: user.display_name,
        }
    }
}

/// Body of `POST /users/{id}/playlists`
#[derive(Debug, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

/// Body of playlist item writes (`POST`/`PUT /playlists/{id}/tracks`)
#[derive(Debug, Serialize)]
pub struct UrisRequest<'a> {
    pub uris: &'a [String],
}

/// `{"error": {"status": 404, "message": "..."}}`
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorObject,
}

#[derive(Debug, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub message: Option<String>,
}
