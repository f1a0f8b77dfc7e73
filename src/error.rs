//! Error types for filedrop.

use thiserror::Error;

/// Common error type for filedrop.
#[derive(Error, Debug)]
pub enum FiledropError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file name that is not a single, normal path component.
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Target name is already taken.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Validation error for user input or configuration values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for filedrop operations.
pub type Result<T> = std::result::Result<T, FiledropError>;
