//! Sync conflict models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a conflict between local and remote data is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// Keep local data
    #[default]
    ClientWins,
    /// Replace local data with the remote version
    ServerWins,
    /// Ask the host's conflict resolver
    Manual,
    /// Use caller-supplied merged data (manual resolutions only)
    Merge,
}

impl ConflictStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientWins => "client-wins",
            Self::ServerWins => "server-wins",
            Self::Manual => "manual",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client-wins" | "client" => Ok(Self::ClientWins),
            "server-wins" | "server" => Ok(Self::ServerWins),
            "manual" => Ok(Self::Manual),
            "merge" => Ok(Self::Merge),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown conflict strategy: {other}"
            ))),
        }
    }
}

/// Conflict reported by the remote endpoint during a sync attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    pub item_id: String,
    pub item_type: String,
    pub client_data: serde_json::Value,
    pub server_data: serde_json::Value,
    /// Detection time (Unix ms)
    pub timestamp: i64,
}

/// Outcome chosen by a manual conflict resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResolution {
    pub strategy: ConflictStrategy,
    /// Required when `strategy` is `merge`
    #[serde(default)]
    pub resolved_data: Option<serde_json::Value>,
}

impl ConflictResolution {
    pub const fn client_wins() -> Self {
        Self {
            strategy: ConflictStrategy::ClientWins,
            resolved_data: None,
        }
    }

    pub const fn server_wins() -> Self {
        Self {
            strategy: ConflictStrategy::ServerWins,
            resolved_data: None,
        }
    }

    pub const fn merge(resolved_data: serde_json::Value) -> Self {
        Self {
            strategy: ConflictStrategy::Merge,
            resolved_data: Some(resolved_data),
        }
    }
}

/// A conflict that ended with the item synced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConflict {
    pub item_id: String,
    pub item_type: String,
    /// Strategy actually applied (never `manual`)
    pub strategy: ConflictStrategy,
    /// Data the item ended up with
    pub data: serde_json::Value,
}
