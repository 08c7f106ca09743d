//! Persistent storage contracts consumed by the sync queue.
//!
//! Two logical stores back the queue: one holding individual queue items
//! keyed by `type` + `id`, and one holding the single stats record.

mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use crate::error::Result;
use crate::models::{QueueItem, SyncStats};

/// Durable key/value storage for queued items (async)
#[allow(async_fn_in_trait)]
pub trait ItemStore {
    /// Insert or replace the item stored under `key`
    async fn put(&self, key: &str, item: &QueueItem) -> Result<()>;

    /// Fetch the item stored under `key`
    async fn get(&self, key: &str) -> Result<Option<QueueItem>>;

    /// Remove the item stored under `key`; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<()>;

    /// List every key in the store
    async fn list_keys(&self) -> Result<Vec<String>>;
}

/// Storage for the aggregate sync stats record (async)
#[allow(async_fn_in_trait)]
pub trait StatsStore {
    /// Load the persisted stats, if any were saved
    async fn load_stats(&self) -> Result<Option<SyncStats>>;

    /// Persist stats, replacing the previous record
    async fn save_stats(&self, stats: &SyncStats) -> Result<()>;
}

impl<T: ItemStore + ?Sized> ItemStore for &T {
    async fn put(&self, key: &str, item: &QueueItem) -> Result<()> {
        (**self).put(key, item).await
    }

    async fn get(&self, key: &str) -> Result<Option<QueueItem>> {
        (**self).get(key).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        (**self).list_keys().await
    }
}

impl<T: StatsStore + ?Sized> StatsStore for &T {
    async fn load_stats(&self) -> Result<Option<SyncStats>> {
        (**self).load_stats().await
    }

    async fn save_stats(&self, stats: &SyncStats) -> Result<()> {
        (**self).save_stats(stats).await
    }
}

impl<T: ItemStore + ?Sized> ItemStore for Arc<T> {
    async fn put(&self, key: &str, item: &QueueItem) -> Result<()> {
        (**self).put(key, item).await
    }

    async fn get(&self, key: &str) -> Result<Option<QueueItem>> {
        (**self).get(key).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        (**self).list_keys().await
    }
}

impl<T: StatsStore + ?Sized> StatsStore for Arc<T> {
    async fn load_stats(&self) -> Result<Option<SyncStats>> {
        (**self).load_stats().await
    }

    async fn save_stats(&self, stats: &SyncStats) -> Result<()> {
        (**self).save_stats(stats).await
    }
}
