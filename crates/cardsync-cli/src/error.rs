use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] cardsync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No record data provided; pass JSON as an argument or pipe it on stdin")]
    EmptyData,
    #[error("Record type cannot be empty")]
    EmptyItemType,
    #[error("Record data is not valid JSON: {0}")]
    InvalidData(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Sync endpoint is not configured. Pass --endpoint, set CARDSYNC_ENDPOINT_URL, or run `cardsync config set --endpoint <URL>`."
    )]
    SyncNotConfigured,
    #[error("Sync did not succeed: {0}")]
    SyncFailed(String),
}
