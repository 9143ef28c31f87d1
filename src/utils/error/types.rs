//! Error types for the access engine

use thiserror::Error;

/// Result type alias for the access engine
pub type Result<T> = std::result::Result<T, AccessError>;

/// Main error type for the access engine
#[derive(Error, Debug)]
pub enum AccessError {
    /// Unknown role, user, module or token
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed mutation input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad signature, wrong algorithm, missing claims, revoked or expired identifier
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Underlying key-value store operation failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
