//! Error types for cardsync-core

use thiserror::Error;

/// Result type alias using cardsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cardsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Item/stats store error
    #[error("Store error: {0}")]
    Store(String),

    /// Remote sync endpoint rejected or failed an operation
    #[error("Sync endpoint error: {0}")]
    Endpoint(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A sync run is already active on this queue
    #[error("Sync already in progress")]
    SyncInProgress,

    /// Invalid sync configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
