use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("Order does not match the loaded playlist: {0}")]
    OrderMismatch(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
