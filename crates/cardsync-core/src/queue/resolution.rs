//! Conflict resolution policy

use super::options::SyncOptions;
use crate::models::{
    ConflictResolution, ConflictStrategy, QueueItem, ResolvedConflict, SyncConflict,
};
use crate::util::unix_timestamp_millis;

/// Settle a conflict reported for `item` according to the run's strategy.
///
/// `None` means the conflict stays unresolved and the item must be marked
/// failed.
pub(super) async fn resolve_conflict(
    item: &QueueItem,
    server_data: serde_json::Value,
    options: &SyncOptions,
) -> Option<ResolvedConflict> {
    match options.conflict_strategy {
        ConflictStrategy::ClientWins => Some(resolved(
            item,
            ConflictStrategy::ClientWins,
            item.data.clone(),
        )),
        ConflictStrategy::ServerWins => {
            Some(resolved(item, ConflictStrategy::ServerWins, server_data))
        }
        ConflictStrategy::Manual => {
            let Some(resolver) = options.on_conflict.as_ref() else {
                tracing::warn!(
                    item_id = %item.id,
                    "Manual conflict strategy without a resolver; leaving conflict unresolved"
                );
                return None;
            };
            let conflict = SyncConflict {
                item_id: item.id.clone(),
                item_type: item.item_type.clone(),
                client_data: item.data.clone(),
                server_data: server_data.clone(),
                timestamp: unix_timestamp_millis(),
            };
            let resolution = resolver.resolve(&conflict).await?;
            apply_resolution(item, resolution, server_data)
        }
        ConflictStrategy::Merge => {
            tracing::warn!(
                item_id = %item.id,
                "Merge is not a run-level strategy; leaving conflict unresolved"
            );
            None
        }
    }
}

/// Apply a manual resolution. Unknown outcomes and merges without data fail.
fn apply_resolution(
    item: &QueueItem,
    resolution: ConflictResolution,
    server_data: serde_json::Value,
) -> Option<ResolvedConflict> {
    match (resolution.strategy, resolution.resolved_data) {
        (ConflictStrategy::ClientWins, _) => Some(resolved(
            item,
            ConflictStrategy::ClientWins,
            item.data.clone(),
        )),
        (ConflictStrategy::ServerWins, _) => {
            Some(resolved(item, ConflictStrategy::ServerWins, server_data))
        }
        (ConflictStrategy::Merge, Some(data)) => {
            Some(resolved(item, ConflictStrategy::Merge, data))
        }
        (strategy, _) => {
            tracing::warn!(
                item_id = %item.id,
                strategy = %strategy,
                "Invalid manual conflict resolution"
            );
            None
        }
    }
}

fn resolved(
    item: &QueueItem,
    strategy: ConflictStrategy,
    data: serde_json::Value,
) -> ResolvedConflict {
    ResolvedConflict {
        item_id: item.id.clone(),
        item_type: item.item_type.clone(),
        strategy,
        data,
    }
}
