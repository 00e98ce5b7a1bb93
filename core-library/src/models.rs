//! Domain models for a loaded playlist
//!
//! Tracks are immutable once fetched. Sorting only ever reorders [`Row`]s,
//! which share their track through an `Arc`.

use crate::error::{LibraryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Web player URL used when the service omits `external_urls.spotify`.
pub const PLAYLIST_WEB_URL: &str = "https://open.spotify.com/playlist";

// =============================================================================
// Tracks
// =============================================================================

/// Credited artist of a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Service identifier, absent for local files
    pub id: Option<String>,
    pub name: String,
}

impl Artist {
    pub fn new(id: Option<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Track as returned by the playlist listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Service identifier; empty for local or unavailable tracks
    pub id: String,
    pub name: String,
    /// Credited artists, primary artist first
    pub artists: Vec<Artist>,
    /// Popularity score 0..=100
    pub popularity: Option<u8>,
    pub duration_ms: Option<u64>,
    /// Web player link
    pub external_url: Option<String>,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: Vec::new(),
            popularity: None,
            duration_ms: None,
            external_url: None,
        }
    }

    pub fn with_artist(mut self, id: Option<&str>, name: impl Into<String>) -> Self {
        self.artists.push(Artist::new(id.map(str::to_string), name));
        self
    }

    pub fn with_popularity(mut self, popularity: u8) -> Self {
        self.popularity = Some(popularity);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Whether the track can be written back to a playlist
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// `spotify:track:<id>`, or `None` for tracks without an id
    pub fn uri(&self) -> Option<String> {
        self.has_id().then(|| format!("spotify:track:{}", self.id))
    }

    /// Name of the first credited artist, empty when there is none
    pub fn primary_artist_name(&self) -> &str {
        self.artists.first().map(|a| a.name.as_str()).unwrap_or("")
    }

    /// Key used to keep the same artist from playing back to back:
    /// first artist id, else first artist name, else `"unknown"`.
    pub fn primary_artist_key(&self) -> &str {
        match self.artists.first() {
            Some(artist) => match artist.id.as_deref() {
                Some(id) if !id.is_empty() => id,
                _ if !artist.name.is_empty() => artist.name.as_str(),
                _ => "unknown",
            },
            None => "unknown",
        }
    }
}

/// A track at its 1-based position in the playlist as loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub track: Arc<Track>,
    pub original_index: usize,
}

impl Row {
    pub fn new(track: Arc<Track>, original_index: usize) -> Self {
        Self {
            track,
            original_index,
        }
    }
}

// =============================================================================
// Playlists & users
// =============================================================================

/// Remote playlist selected by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistHandle {
    pub id: String,
    pub display_name: String,
    /// Track count reported by the playlist listing
    pub track_total: Option<u32>,
}

impl PlaylistHandle {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            track_total: None,
        }
    }

    pub fn web_url(&self) -> String {
        format!("{}/{}", PLAYLIST_WEB_URL, self.id)
    }
}

/// Authenticated user (`/me`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

impl UserProfile {
    /// Display name, falling back to the user id
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Playlist produced by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPlaylist {
    pub id: String,
    pub external_url: String,
}

impl CreatedPlaylist {
    /// Uses the web player URL when the service returned none.
    pub fn new(id: impl Into<String>, external_url: Option<String>) -> Self {
        let id = id.into();
        let external_url = external_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("{}/{}", PLAYLIST_WEB_URL, id));
        Self { id, external_url }
    }
}

// =============================================================================
// Sort state
// =============================================================================

/// Column a track list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    /// First credited artist's name
    Artist,
    Popularity,
    DurationMs,
    /// Position as loaded
    #[serde(rename = "index")]
    OriginalIndex,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Artist => "artist",
            SortField::Popularity => "popularity",
            SortField::DurationMs => "duration_ms",
            SortField::OriginalIndex => "index",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, SortField::Name | SortField::Artist)
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(SortField::Name),
            "artist" => Ok(SortField::Artist),
            "popularity" => Ok(SortField::Popularity),
            "duration_ms" => Ok(SortField::DurationMs),
            "index" => Ok(SortField::OriginalIndex),
            other => Err(LibraryError::UnknownSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    None,
    Column,
    Popularity,
    Smart,
    Random,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::None => "none",
            SortMode::Column => "column",
            SortMode::Popularity => "popularity",
            SortMode::Smart => "smart",
            SortMode::Random => "random",
        }
    }
}
