use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Commit-as-new needs the signed-in user; call `refresh_identity` first.
    #[error("Missing user id")]
    MissingUser,

    #[error("Pick a playlist first")]
    EmptySelection,

    #[error("No tracks loaded")]
    EmptyResult,

    #[error("A playlist load is already in progress")]
    LoadInProgress,

    #[error("Spotify request failed: {0}")]
    Remote(#[from] provider_spotify::SpotifyError),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Confirmation prompt failed: {0}")]
    Prompt(BridgeError),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
