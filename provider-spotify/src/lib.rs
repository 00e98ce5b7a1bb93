//! # Spotify Provider
//!
//! Web API client for the re-sequencing core.
//!
//! ## Overview
//!
//! This module provides:
//! - Bearer-token requests through the host `HttpClient`
//! - Bounded retry with shared exponential backoff for network failures,
//!   rate limiting (429) and transient server errors (5xx)
//! - Paginated listing that follows `next` links
//! - Chunked playlist writes (100 URIs per request) and two-phase overwrite

pub mod connector;
pub mod error;
pub mod retry;
pub mod types;

pub use connector::{SpotifyClient, WRITE_CHUNK_SIZE};
pub use error::{Result, SpotifyError};
pub use retry::{Backoff, RetryClass, RetryPolicy};
