use thiserror::Error;

/// Failures raised while wiring up the runtime, before any session starts.
#[derive(Error, Debug)]
pub enum Error {
    /// A setting is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The host did not inject a required capability.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// A default capability could not be constructed.
    #[error("Failed to initialize default {capability}: {message}")]
    CapabilityInit { capability: String, message: String },

    /// The tracing subscriber or its filter could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
