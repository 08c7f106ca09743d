//! libSQL-backed queue item and stats store

use libsql::Connection;

use crate::error::Result;
use crate::models::{QueueItem, SyncStats, SYNC_STATS_KEY};
use crate::store::{ItemStore, StatsStore};
use crate::util::unix_timestamp_millis;

/// libSQL implementation of [`ItemStore`] and [`StatsStore`]
///
/// Items and stats are stored as JSON payloads.
#[derive(Clone)]
pub struct LibSqlQueueStore {
    conn: Connection,
}

impl LibSqlQueueStore {
    /// Create a new store with the given connection
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    async fn get_meta(&self, name: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT payload FROM sync_meta WHERE name = ?", [name])
            .await?;

        if let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set_meta(&self, name: &str, payload: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO sync_meta (name, payload, updated_at) VALUES (?, ?, ?)",
                libsql::params![name, payload, unix_timestamp_millis()],
            )
            .await?;
        Ok(())
    }
}

impl ItemStore for LibSqlQueueStore {
    async fn put(&self, key: &str, item: &QueueItem) -> Result<()> {
        let payload = serde_json::to_string(item)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO queue_items (key, item_type, payload, updated_at)
                 VALUES (?, ?, ?, ?)",
                libsql::params![
                    key,
                    item.item_type.as_str(),
                    payload,
                    unix_timestamp_millis()
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<QueueItem>> {
        let mut rows = self
            .conn
            .query("SELECT payload FROM queue_items WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let payload: String = row.get(0)?;
            Ok(Some(serde_json::from_str(&payload)?))
        } else {
            Ok(None)
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM queue_items WHERE key = ?", [key])
            .await?;
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query("SELECT key FROM queue_items ORDER BY key", ())
            .await?;

        let mut keys = Vec::new();
        while let Some(row) = rows.next().await? {
            keys.push(row.get::<String>(0)?);
        }
        Ok(keys)
    }
}

impl StatsStore for LibSqlQueueStore {
    async fn load_stats(&self) -> Result<Option<SyncStats>> {
        let Some(payload) = self.get_meta(SYNC_STATS_KEY).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&payload)?))
    }

    async fn save_stats(&self, stats: &SyncStats) -> Result<()> {
        let payload = serde_json::to_string(stats)?;
        self.set_meta(SYNC_STATS_KEY, &payload).await
    }
}
