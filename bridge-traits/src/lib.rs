//! # Host Bridge Traits
//!
//! Capability contracts the re-sequencing core needs from its host.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP transport
//! - [`ConfirmationPrompt`](prompt::ConfirmationPrompt) - Yes/no gate before destructive writes
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! The core refuses to start when a required capability is missing:
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .http_client(client)
//!     .build()?; // Err(CapabilityMissing { capability: "ConfirmationPrompt", .. })
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Transports must
//! report "no response received" as [`BridgeError::Network`] so callers can
//! distinguish retryable network failures from everything else.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks behind an `Arc`.

pub mod error;
pub mod http;
pub mod logging;
pub mod prompt;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use prompt::{ConfirmationPrompt, ConfirmationRequest, FixedConfirmation};
