use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use cardsync_core::db::{Database, LibSqlQueueStore};
use cardsync_core::util::normalize_text_option;
use cardsync_core::{
    ApplyOutcome, Error, QueueItem, QueueItemDraft, ResolvedConflict, SyncEndpoint, SyncQueue,
    SyncStats,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueListItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub status: String,
    pub priority: i32,
    pub retry_count: u32,
    pub created_at: i64,
    pub relative_time: String,
    pub data: Value,
}

/// Sync queue opened over the local database file
pub struct LocalQueue<E> {
    _db: Database,
    pub queue: SyncQueue<LibSqlQueueStore, E>,
}

/// Endpoint for commands that never sync
pub struct OfflineEndpoint;

impl SyncEndpoint for OfflineEndpoint {
    async fn apply(&self, item: &QueueItem) -> cardsync_core::Result<ApplyOutcome> {
        Err(Error::Endpoint(format!(
            "no sync endpoint available for {}",
            item.key()
        )))
    }
}

pub async fn open_queue<E: SyncEndpoint>(
    db_path: &Path,
    endpoint: E,
) -> Result<LocalQueue<E>, CliError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::open(db_path).await?;
    let queue = SyncQueue::new(db.queue_store(), endpoint);
    queue.initialize().await;
    Ok(LocalQueue { _db: db, queue })
}

pub async fn enqueue_item(db_path: &Path, draft: QueueItemDraft) -> Result<String, CliError> {
    let local = open_queue(db_path, OfflineEndpoint).await?;
    Ok(local.queue.queue_for_sync(draft).await?)
}

pub async fn list_pending(db_path: &Path) -> Result<Vec<QueueItem>, CliError> {
    let local = open_queue(db_path, OfflineEndpoint).await?;
    Ok(local.queue.pending_items())
}

pub async fn load_stats(db_path: &Path) -> Result<SyncStats, CliError> {
    let local = open_queue(db_path, OfflineEndpoint).await?;
    Ok(local.queue.get_stats())
}

pub fn normalize_item_type(item_type: &str) -> Result<String, CliError> {
    let trimmed = item_type.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyItemType)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Payload from the argument, else from piped stdin
pub fn resolve_item_data(data: Option<String>) -> Result<Value, CliError> {
    if let Some(raw) = data.as_deref().and_then(normalize_content) {
        return parse_item_data(&raw);
    }

    if let Some(raw) = read_piped_stdin()? {
        return parse_item_data(&raw);
    }

    Err(CliError::EmptyData)
}

pub fn parse_item_data(raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw).map_err(|error| CliError::InvalidData(error.to_string()))
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

/// Flag, then `CARDSYNC_ENDPOINT_URL`, then the profile
pub fn resolve_endpoint_url(
    explicit: Option<String>,
    from_env: Option<String>,
    from_profile: Option<String>,
) -> Option<String> {
    normalize_text_option(explicit)
        .or_else(|| normalize_text_option(from_env))
        .or_else(|| normalize_text_option(from_profile))
}

pub fn auth_token_from_env() -> Option<String> {
    normalize_text_option(env::var("CARDSYNC_AUTH_TOKEN").ok())
}

pub fn format_item_lines(items: &[QueueItem]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    items
        .iter()
        .map(|item| {
            let short_id = item.id.chars().take(13).collect::<String>();
            let relative_time = format_relative_time(item.created_at, now_ms);
            let preview = data_preview(&item.data, 40);
            let status = item.sync_status.to_string();
            format!(
                "{short_id:<13}  {:<10}  p{:<3}  {status:<7}  retries={:<2}  {relative_time:<10}  {preview}",
                item.item_type, item.sync_priority, item.retry_count
            )
        })
        .collect()
}

pub fn item_to_list_item(item: &QueueItem) -> QueueListItem {
    let now_ms = Utc::now().timestamp_millis();
    QueueListItem {
        id: item.id.clone(),
        item_type: item.item_type.clone(),
        status: item.sync_status.to_string(),
        priority: item.sync_priority,
        retry_count: item.retry_count,
        created_at: item.created_at,
        relative_time: format_relative_time(item.created_at, now_ms),
        data: item.data.clone(),
    }
}

pub fn format_stats_lines(stats: &SyncStats) -> Vec<String> {
    let last_sync = stats
        .last_sync_at
        .map_or_else(|| "never".to_string(), format_sync_timestamp);
    vec![
        format!("pending    {}", stats.pending),
        format!("synced     {}", stats.synced),
        format!("failed     {}", stats.failed),
        format!("conflicts  {}", stats.conflicts),
        format!("last sync  {last_sync}"),
    ]
}

pub fn format_resolved_lines(resolved: &[ResolvedConflict]) -> Vec<String> {
    resolved
        .iter()
        .map(|conflict| {
            format!(
                "{:<11}  {}:{}  {}",
                conflict.strategy.as_str(),
                conflict.item_type,
                conflict.item_id,
                data_preview(&conflict.data, 60)
            )
        })
        .collect()
}

pub fn data_preview(data: &Value, max_chars: usize) -> String {
    let rendered = data.to_string();
    if rendered.chars().count() <= max_chars {
        rendered
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = rendered.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os("CARDSYNC_DB_PATH").map(PathBuf::from))
    {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("cardsync").join("cardsync.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}
