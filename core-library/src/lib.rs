//! # Playlist Library
//!
//! Owns the tracks of the playlist being edited and the pure sort strategies
//! that reorder them.
//!
//! ## Overview
//!
//! - [`models`]: tracks, rows, playlists and sort vocabulary
//! - [`repositories`]: in-memory original and current row order
//! - [`sort`]: column, popularity, smart and random strategies
//!
//! Nothing here performs I/O. The service layer loads tracks through the
//! provider and hands them to a [`TrackRepository`].

pub mod error;
pub mod models;
pub mod repositories;
pub mod sort;

pub use error::{LibraryError, Result};
pub use models::{
    Artist, CreatedPlaylist, PlaylistHandle, Row, SortDirection, SortField, SortMode, Track,
    UserProfile,
};
pub use repositories::TrackRepository;
pub use sort::{SmartSortParams, SortState, SortStrategy};
