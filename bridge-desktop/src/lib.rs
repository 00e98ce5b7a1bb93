//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux):
//! - `HttpClient` using `reqwest`
//! - `ConfirmationPrompt` reading a y/N answer from the terminal
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, TerminalConfirmationPrompt};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .http_client(Arc::new(ReqwestHttpClient::new()?))
//!     .confirmation_prompt(Arc::new(TerminalConfirmationPrompt))
//!     .build()?;
//! ```

mod http;
mod prompt;

pub use http::ReqwestHttpClient;
pub use prompt::TerminalConfirmationPrompt;
