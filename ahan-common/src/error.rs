//! Common error types for AhanHub

use thiserror::Error;

/// Common result type for AhanHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the catalog service
#[derive(Error, Debug)]
pub enum Error {
    /// Update/delete/get target is absent from the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Create collided with an existing identifier
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Form input failed local validation; no store call was made
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The store call did not complete (connectivity or database I/O)
    #[error("Store unavailable: {0}")]
    Network(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl Error {
    /// Short machine-readable code, used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "NOT_FOUND",
            Error::AlreadyExists(_) => "ALREADY_EXISTS",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Network(_) => "NETWORK_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
