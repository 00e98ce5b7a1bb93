//! # Repository Pattern Implementation
//!
//! Session-scoped storage for the rows of the playlist being re-sequenced.
//! Nothing is persisted: a repository lives exactly as long as one loaded
//! playlist and is replaced wholesale on the next load.

pub mod track;

pub use track::TrackRepository;
