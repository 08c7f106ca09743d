//! Queue item model

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::{normalize_text_option, unix_timestamp_millis};

/// Prefix shared by every persisted queue item key
pub const QUEUE_KEY_PREFIX: &str = "sync-queue:";

/// Priority assigned to items enqueued without an explicit one
pub const DEFAULT_SYNC_PRIORITY: i32 = 1;

/// Sync status of a persisted queue item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Waiting for its first sync attempt
    #[default]
    Pending,
    /// At least one attempt failed; retried on the next run
    Failed,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// A locally created or edited record waiting to be replayed remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    /// Unique identifier within its type
    pub id: String,
    /// Record category (e.g. `card`, `template`, `memory`)
    #[serde(rename = "type")]
    pub item_type: String,
    /// Opaque record payload
    pub data: serde_json::Value,
    /// Enqueue timestamp (Unix ms)
    pub created_at: i64,
    #[serde(default)]
    pub sync_status: SyncStatus,
    /// Higher priorities sync first
    #[serde(default = "default_sync_priority")]
    pub sync_priority: i32,
    /// Number of failed attempts so far
    #[serde(default)]
    pub retry_count: u32,
}

const fn default_sync_priority() -> i32 {
    DEFAULT_SYNC_PRIORITY
}

impl QueueItem {
    /// Composite store key for this item
    #[must_use]
    pub fn key(&self) -> String {
        queue_key(&self.item_type, &self.id)
    }

    /// Copy of this item after one more failed attempt
    #[must_use]
    pub fn into_failed(mut self) -> Self {
        self.sync_status = SyncStatus::Failed;
        self.retry_count = self.retry_count.saturating_add(1);
        self
    }

    /// Sync order: priority descending, then oldest first, then id.
    pub fn sync_order(&self, other: &Self) -> Ordering {
        other
            .sync_priority
            .cmp(&self.sync_priority)
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Build the namespaced store key for an item type and id
pub fn queue_key(item_type: &str, id: &str) -> String {
    format!("{QUEUE_KEY_PREFIX}{item_type}:{id}")
}

/// Whether a store key belongs to the sync queue namespace
pub fn is_queue_key(key: &str) -> bool {
    key.starts_with(QUEUE_KEY_PREFIX)
}

/// Sort items into sync order in place
pub fn sort_for_sync(items: &mut [QueueItem]) {
    items.sort_by(QueueItem::sync_order);
}

/// Partial queue item accepted by enqueue; missing fields are filled in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItemDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    pub data: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub sync_priority: Option<i32>,
}

impl QueueItemDraft {
    pub fn new(item_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: None,
            item_type: item_type.into(),
            data,
            created_at: None,
            sync_priority: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.sync_priority = Some(priority);
        self
    }

    #[must_use]
    pub const fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Fill in defaults and produce a pending queue item.
    ///
    /// Blank ids are replaced with a fresh UUID v7.
    #[must_use]
    pub fn into_item(self) -> QueueItem {
        let id = normalize_text_option(self.id).unwrap_or_else(|| Uuid::now_v7().to_string());
        QueueItem {
            id,
            item_type: self.item_type,
            data: self.data,
            created_at: self.created_at.unwrap_or_else(unix_timestamp_millis),
            sync_status: SyncStatus::Pending,
            sync_priority: self.sync_priority.unwrap_or(DEFAULT_SYNC_PRIORITY),
            retry_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn item(id: &str, priority: i32, created_at: i64) -> QueueItem {
        QueueItemDraft::new("card", json!({}))
            .with_id(id)
            .with_priority(priority)
            .with_created_at(created_at)
            .into_item()
    }

    #[test]
    fn draft_fills_defaults() {
        let item = QueueItemDraft::new("memory", json!({"x": 1})).into_item();
        assert!(!item.id.is_empty());
        assert_eq!(item.sync_priority, 1);
        assert_eq!(item.sync_status, SyncStatus::Pending);
        assert_eq!(item.retry_count, 0);
        assert!(item.created_at > 0);
    }

    #[test]
    fn draft_replaces_blank_id() {
        let item = QueueItemDraft::new("memory", json!(null))
            .with_id("   ")
            .into_item();
        assert!(Uuid::parse_str(&item.id).is_ok());
    }

    #[test]
    fn key_is_namespaced_by_type() {
        let item = item("abc", 1, 1);
        assert_eq!(item.key(), "sync-queue:card:abc");
        assert!(is_queue_key(&item.key()));
        assert!(!is_queue_key("sync-stats"));
    }

    #[test]
    fn sort_orders_by_priority_then_age() {
        let mut items = vec![item("a", 1, 10), item("b", 3, 30), item("c", 2, 20), item("d", 3, 5)];
        sort_for_sync(&mut items);
        let ids = items.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn into_failed_bumps_retry_count() {
        let failed = item("a", 1, 1).into_failed().into_failed();
        assert_eq!(failed.sync_status, SyncStatus::Failed);
        assert_eq!(failed.retry_count, 2);
    }

    #[test]
    fn missing_status_deserializes_as_pending() {
        let item: QueueItem = serde_json::from_value(json!({
            "id": "a",
            "type": "card",
            "data": {"name": "Pikachu"},
            "createdAt": 42
        }))
        .unwrap();
        assert_eq!(item.sync_status, SyncStatus::Pending);
        assert_eq!(item.sync_priority, 1);
        assert_eq!(item.retry_count, 0);
    }
}
