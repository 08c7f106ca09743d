//! In-process store backed by a `BTreeMap`

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{ItemStore, StatsStore};
use crate::error::Result;
use crate::models::{QueueItem, SyncStats};

/// Ephemeral implementation of both store contracts.
///
/// Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, QueueItem>>,
    stats: Mutex<Option<SyncStats>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    fn items(&self) -> MutexGuard<'_, BTreeMap<String, QueueItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ItemStore for MemoryStore {
    async fn put(&self, key: &str, item: &QueueItem) -> Result<()> {
        self.items().insert(key.to_string(), item.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<QueueItem>> {
        Ok(self.items().get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.items().remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.items().keys().cloned().collect())
    }
}

impl StatsStore for MemoryStore {
    async fn load_stats(&self) -> Result<Option<SyncStats>> {
        Ok(*self.stats.lock().unwrap_or_else(PoisonError::into_inner))
    }

    async fn save_stats(&self, stats: &SyncStats) -> Result<()> {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner) = Some(*stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueueItemDraft;
    use serde_json::json;

    #[tokio::test]
    async fn put_get_remove_roundtrip() {
        let store = MemoryStore::new();
        let item = QueueItemDraft::new("card", json!({"name": "Charizard"})).into_item();
        let key = item.key();

        store.put(&key, &item).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(item));
        assert_eq!(store.list_keys().await.unwrap(), vec![key.clone()]);

        store.remove(&key).await.unwrap();
        assert!(store.get(&key).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn stats_default_to_none() {
        let store = MemoryStore::new();
        assert!(store.load_stats().await.unwrap().is_none());

        let stats = SyncStats {
            synced: 4,
            ..SyncStats::default()
        };
        store.save_stats(&stats).await.unwrap();
        assert_eq!(store.load_stats().await.unwrap(), Some(stats));
    }
}
