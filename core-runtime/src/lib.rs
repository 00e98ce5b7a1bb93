//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the re-sequencing crates:
//! - Logging and tracing setup
//! - Configuration builder with fail-fast capability checks
//! - Event bus for auth and session events

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
