//! Batch processing for a sync run

use super::options::SyncOptions;
use super::resolution::resolve_conflict;
use super::SyncQueue;
use crate::endpoint::{ApplyOutcome, SyncEndpoint};
use crate::error::Result;
use crate::models::{QueueItem, ResolvedConflict, RunCounters};
use crate::store::{ItemStore, StatsStore};

impl<S, E> SyncQueue<S, E>
where
    S: ItemStore + StatsStore,
    E: SyncEndpoint,
{
    /// Sync one batch, group by group.
    ///
    /// Per-item endpoint failures only fail that item. Store failures while
    /// recording outcomes abort the run; outcomes recorded before the failure
    /// are already counted in `counters`.
    pub(super) async fn process_batch(
        &self,
        batch: &[QueueItem],
        options: &SyncOptions,
        counters: &mut RunCounters,
        resolved: &mut Vec<ResolvedConflict>,
    ) -> Result<()> {

        for (item_type, group) in group_by_type(batch) {
            if let Err(error) = self.endpoint.begin_group(item_type, &group).await {
                tracing::warn!(
                    item_type,
                    items = group.len(),
                    "Sync group failed before any item was applied: {error}"
                );
                for item in &group {
                    self.mark_failed(item).await?;
                    counters.failed += 1;
                }
                continue;
            }

            for item in &group {
                if item.retry_count >= options.retry_count {
                    tracing::warn!(
                        item_id = %item.id,
                        retries = item.retry_count,
                        "Item is past its retry budget; attempting anyway"
                    );
                }

                match self.endpoint.apply(item).await {
                    Ok(ApplyOutcome::Applied) => {
                        self.mark_synced(item).await?;
                        counters.synced += 1;
                    }
                    Ok(ApplyOutcome::Conflict { server_data }) => {
                        counters.conflicts += 1;
                        if let Some(resolution) =
                            resolve_conflict(item, server_data, options).await
                        {
                            self.mark_synced(item).await?;
                            counters.synced += 1;
                            resolved.push(resolution);
                        } else {
                            self.mark_failed(item).await?;
                            counters.failed += 1;
                        }
                    }
                    Err(error) => {
                        tracing::warn!(item_id = %item.id, "Failed to sync item: {error}");
                        self.mark_failed(item).await?;
                        counters.failed += 1;
                    }
                }
            }
        }

        Ok(())
    }

    async fn mark_synced(&self, item: &QueueItem) -> Result<()> {
        self.store.remove(&item.key()).await
    }

    async fn mark_failed(&self, item: &QueueItem) -> Result<()> {
        let failed = item.clone().into_failed();
        self.store.put(&failed.key(), &failed).await
    }
}

/// Split a batch into per-type groups, in order of first appearance
fn group_by_type(batch: &[QueueItem]) -> Vec<(&str, Vec<QueueItem>)> {
    let mut groups: Vec<(&str, Vec<QueueItem>)> = Vec::new();
    for item in batch {
        if let Some((_, group)) = groups
            .iter_mut()
            .find(|(item_type, _)| *item_type == item.item_type)
        {
            group.push(item.clone());
        } else {
            groups.push((item.item_type.as_str(), vec![item.clone()]));
        }
    }
    groups
}
