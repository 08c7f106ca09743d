//! Data models for cardsync

mod queue_item;
mod sync_conflict;
mod sync_stats;

pub use queue_item::{
    is_queue_key, queue_key, sort_for_sync, QueueItem, QueueItemDraft, SyncStatus,
    DEFAULT_SYNC_PRIORITY, QUEUE_KEY_PREFIX,
};
pub use sync_conflict::{ConflictResolution, ConflictStrategy, ResolvedConflict, SyncConflict};
pub use sync_stats::{RunCounters, SyncStats, SYNC_STATS_KEY};
