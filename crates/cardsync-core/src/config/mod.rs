//! Sync run settings.
//!
//! `SyncSettings` is the serializable form of the tunable parts of
//! [`crate::queue::SyncOptions`]; hosts persist it in their own config files
//! and turn it into options right before a run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::ConflictStrategy;
use crate::queue::SyncOptions;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_RETRY_COUNT: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
const MAX_BATCH_SIZE: usize = 1_000;

/// Persisted sync tuning knobs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct SyncSettings {
    pub batch_size: usize,
    pub retry_count: u32,
    pub retry_delay_ms: u64,
    pub conflict_strategy: ConflictStrategy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            conflict_strategy: ConflictStrategy::ClientWins,
        }
    }
}

impl SyncSettings {
    /// Reject values a sync run cannot honor.
    ///
    /// `merge` needs per-conflict data, so it is only valid as a manual
    /// resolution outcome.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(Error::Config(format!(
                "batch_size must be between 1 and {MAX_BATCH_SIZE} (got {})",
                self.batch_size
            )));
        }
        if self.conflict_strategy == ConflictStrategy::Merge {
            return Err(Error::Config(
                "conflict_strategy `merge` is only valid for manual resolutions".to_string(),
            ));
        }
        Ok(())
    }

    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Build run options with no hooks attached
    pub fn to_options(&self) -> SyncOptions {
        SyncOptions::default()
            .batch_size(self.batch_size)
            .retry_count(self.retry_count)
            .retry_delay(self.retry_delay())
            .conflict_strategy(self.conflict_strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sync_options() {
        let settings = SyncSettings::default();
        let options = SyncOptions::default();
        assert_eq!(settings.batch_size, options.batch_size);
        assert_eq!(settings.retry_count, options.retry_count);
        assert_eq!(settings.retry_delay(), options.retry_delay);
        assert_eq!(settings.conflict_strategy, options.conflict_strategy);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_batch_and_merge() {
        let zero = SyncSettings {
            batch_size: 0,
            ..SyncSettings::default()
        };
        assert!(zero.validate().is_err());

        let merge = SyncSettings {
            conflict_strategy: ConflictStrategy::Merge,
            ..SyncSettings::default()
        };
        assert!(merge.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let settings: SyncSettings =
            serde_json::from_str(r#"{"batch_size": 25, "conflict_strategy": "server-wins"}"#)
                .unwrap();
        assert_eq!(settings.batch_size, 25);
        assert_eq!(settings.retry_count, DEFAULT_RETRY_COUNT);
        assert_eq!(settings.conflict_strategy, ConflictStrategy::ServerWins);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = serde_json::from_str::<SyncSettings>(r#"{"batchsize": 25}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn to_options_carries_values() {
        let settings = SyncSettings {
            batch_size: 4,
            retry_count: 1,
            retry_delay_ms: 50,
            conflict_strategy: ConflictStrategy::ServerWins,
        };
        let options = settings.to_options();
        assert_eq!(options.batch_size, 4);
        assert_eq!(options.retry_count, 1);
        assert_eq!(options.retry_delay, Duration::from_millis(50));
        assert_eq!(options.conflict_strategy, ConflictStrategy::ServerWins);
    }
}
