//! Error types for the Trellis server

use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Missing or unusable configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Socket or listener failure
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The oracle HTTP client could not be built
    #[error("Oracle client error: {0}")]
    OracleClientError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;
