//! Aggregate sync statistics

use serde::{Deserialize, Serialize};

/// Fixed name of the persisted stats record
pub const SYNC_STATS_KEY: &str = "sync-stats";

/// Counters that survive across sessions, even after items are cleared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncStats {
    /// Items known to be waiting in the queue
    pub pending: u64,
    /// Items synced over all runs
    pub synced: u64,
    /// Failed attempts over all runs
    pub failed: u64,
    /// Conflicts reported by the remote endpoint over all runs
    pub conflicts: u64,
    /// Completion time of the last run (Unix ms)
    pub last_sync_at: Option<i64>,
}

/// Counters accumulated by a single sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub synced: u64,
    pub failed: u64,
    pub conflicts: u64,
}

impl SyncStats {
    /// Stats as they would look with `run` folded in (no `last_sync_at` change).
    #[must_use]
    pub const fn merged_with(&self, run: RunCounters) -> Self {
        Self {
            pending: self.pending.saturating_sub(run.synced),
            synced: self.synced.saturating_add(run.synced),
            failed: self.failed.saturating_add(run.failed),
            conflicts: self.conflicts.saturating_add(run.conflicts),
            last_sync_at: self.last_sync_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_with_floors_pending_at_zero() {
        let stats = SyncStats {
            pending: 2,
            synced: 10,
            ..SyncStats::default()
        };
        let merged = stats.merged_with(RunCounters {
            synced: 5,
            failed: 1,
            conflicts: 2,
        });
        assert_eq!(merged.pending, 0);
        assert_eq!(merged.synced, 15);
        assert_eq!(merged.failed, 1);
        assert_eq!(merged.conflicts, 2);
    }

    #[test]
    fn stats_deserialize_with_missing_fields() {
        let stats: SyncStats = serde_json::from_str(r#"{"synced": 3}"#).unwrap();
        assert_eq!(stats.synced, 3);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.last_sync_at, None);
    }
}
