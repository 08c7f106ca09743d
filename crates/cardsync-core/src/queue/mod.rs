//! Offline sync queue.
//!
//! Buffers locally created or edited records in an [`ItemStore`] and replays
//! them against a [`SyncEndpoint`] when a run is triggered. Runs are ordered
//! (priority descending, oldest first), batched, isolated per item, and settle
//! remote conflicts through a [`ConflictStrategy`].
//!
//! The in-memory queue is only a cache: it is always rebuilt from the store,
//! so a restarted host recovers the exact pending set.
//!
//! [`ConflictStrategy`]: crate::models::ConflictStrategy

mod batch;
mod options;
mod resolution;
mod result;

pub use options::{ConflictResolver, ErrorHook, StatsHook, SyncOptions};
pub use result::SyncResult;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::endpoint::SyncEndpoint;
use crate::error::{Error, Result};
use crate::models::{
    is_queue_key, sort_for_sync, QueueItem, QueueItemDraft, RunCounters, SyncStats,
};
use crate::state::SyncState;
use crate::store::{ItemStore, StatsStore};
use crate::util::unix_timestamp_millis;

/// Generation value meaning "no run active"
const IDLE: u64 = 0;

/// Sync queue over a persistent store and a remote endpoint.
///
/// Construct one per store with [`SyncQueue::new`], then call
/// [`SyncQueue::initialize`] once before use. Only one run may be active at a
/// time; concurrent [`SyncQueue::start_sync`] calls are rejected.
pub struct SyncQueue<S, E> {
    store: S,
    endpoint: E,
    queue: Mutex<Vec<QueueItem>>,
    stats: Mutex<SyncStats>,
    /// Generation of the active run, or [`IDLE`]
    active_run: AtomicU64,
    last_run: AtomicU64,
    state: watch::Sender<SyncState>,
}

/// Counters and resolutions collected while a run progresses
#[derive(Default)]
struct RunReport {
    counters: RunCounters,
    resolved: Vec<crate::models::ResolvedConflict>,
    cancelled: bool,
    folded: bool,
}

/// Clears the active flag when a run ends, unless a newer run owns it
struct ActiveRunGuard<'a> {
    active_run: &'a AtomicU64,
    run_id: u64,
}

impl Drop for ActiveRunGuard<'_> {
    fn drop(&mut self) {
        let _ = self.active_run.compare_exchange(
            self.run_id,
            IDLE,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

impl<S, E> SyncQueue<S, E>
where
    S: ItemStore + StatsStore,
    E: SyncEndpoint,
{
    pub fn new(store: S, endpoint: E) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        Self {
            store,
            endpoint,
            queue: Mutex::new(Vec::new()),
            stats: Mutex::new(SyncStats::default()),
            active_run: AtomicU64::new(IDLE),
            last_run: AtomicU64::new(IDLE),
            state,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Load stats and rebuild the queue from the store.
    ///
    /// Store errors are logged and replaced with empty defaults; this never
    /// fails so it cannot block host startup.
    pub async fn initialize(&self) {
        let mut stats = match self.store.load_stats().await {
            Ok(stats) => stats.unwrap_or_default(),
            Err(error) => {
                tracing::warn!("Failed to load sync stats, starting from zero: {error}");
                SyncStats::default()
            }
        };

        let items = match self.load_items().await {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!("Failed to rebuild sync queue, starting empty: {error}");
                Vec::new()
            }
        };

        stats.pending = items.len() as u64;
        tracing::info!(pending = stats.pending, "Sync queue initialized");
        *self.lock_stats() = stats;
        *self.lock_queue() = items;
    }

    /// Persist a new queue item and return its id.
    ///
    /// Missing fields are filled in (fresh id, current time, priority 1).
    /// Re-queuing an existing type and id replaces the stored record and is
    /// counted as pending once. Store failures propagate and leave in-memory
    /// state untouched.
    pub async fn queue_for_sync(&self, draft: QueueItemDraft) -> Result<String> {
        let item = draft.into_item();
        let key = item.key();
        let replaces = matches!(self.store.get(&key).await, Ok(Some(_)));
        self.store.put(&key, &item).await?;

        if !replaces {
            self.lock_stats().pending += 1;
        }
        // A running sync works on its own snapshot; the next run rebuilds.
        if !self.is_syncing() {
            let mut queue = self.lock_queue();
            queue.retain(|queued| queued.key() != key);
            let position = queue.partition_point(|queued| queued.sync_order(&item).is_lt());
            queue.insert(position, item.clone());
        }

        tracing::debug!(item_id = %item.id, item_type = %item.item_type, "Queued item for sync");
        Ok(item.id)
    }

    /// Replay every queued item against the endpoint.
    ///
    /// Never fails: re-entrancy and run-level errors are reported through the
    /// returned [`SyncResult`] (and `on_error`).
    pub async fn start_sync(&self, options: SyncOptions) -> SyncResult {
        let run_id = self.last_run.fetch_add(1, Ordering::SeqCst) + 1;
        if self
            .active_run
            .compare_exchange(IDLE, run_id, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Sync already in progress; rejecting new run");
            return SyncResult::rejected(self.get_stats());
        }
        let _guard = ActiveRunGuard {
            active_run: &self.active_run,
            run_id,
        };
        self.state.send_replace(SyncState::Syncing);

        let mut report = RunReport::default();
        match self.run(run_id, &options, &mut report).await {
            Ok(stats) => {
                let success = report.counters.failed == 0;
                tracing::info!(
                    synced = report.counters.synced,
                    failed = report.counters.failed,
                    conflicts = report.counters.conflicts,
                    cancelled = report.cancelled,
                    "Sync run finished"
                );
                if self.is_current(run_id) {
                    self.state.send_replace(if success {
                        SyncState::Synced
                    } else {
                        SyncState::Error
                    });
                }
                if let Some(on_complete) = &options.on_complete {
                    on_complete(&stats);
                }
                SyncResult {
                    success,
                    stats,
                    errors: Vec::new(),
                    resolved: report.resolved,
                    cancelled: report.cancelled,
                }
            }
            Err(error) => {
                tracing::error!("Sync run aborted: {error}");
                if !report.folded {
                    self.fold_partial_progress(report.counters).await;
                }
                self.refresh_queue().await;
                if self.is_current(run_id) {
                    self.state.send_replace(SyncState::Error);
                }
                if let Some(on_error) = &options.on_error {
                    on_error(&error);
                }
                SyncResult {
                    success: false,
                    stats: self.get_stats(),
                    errors: vec![error],
                    resolved: report.resolved,
                    cancelled: report.cancelled,
                }
            }
        }
    }

    /// Release the active flag so a new run may start.
    ///
    /// Advisory: in-flight remote calls are not interrupted and work already
    /// done is kept. The cancelled run stops at its next batch boundary.
    /// No-op when no run is active.
    pub fn cancel_sync(&self) {
        let previous = self.active_run.swap(IDLE, Ordering::SeqCst);
        if previous != IDLE {
            tracing::info!(run = previous, "Sync run cancelled");
            self.state.send_replace(SyncState::Cancelled);
        }
    }

    /// Snapshot of the current stats
    pub fn get_stats(&self) -> SyncStats {
        *self.lock_stats()
    }

    /// Snapshot of the in-memory queue in sync order
    pub fn pending_items(&self) -> Vec<QueueItem> {
        self.lock_queue().clone()
    }

    pub fn is_syncing(&self) -> bool {
        self.active_run.load(Ordering::SeqCst) != IDLE
    }

    /// Observe run lifecycle changes
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    async fn run(
        &self,
        run_id: u64,
        options: &SyncOptions,
        report: &mut RunReport,
    ) -> Result<SyncStats> {
        let items = self.load_items().await?;
        *self.lock_queue() = items.clone();

        let batch_size = options.effective_batch_size();
        let batch_count = items.len().div_ceil(batch_size);
        tracing::info!(
            items = items.len(),
            batches = batch_count,
            strategy = %options.conflict_strategy,
            "Starting sync run"
        );

        for (index, batch) in items.chunks(batch_size).enumerate() {
            if !self.is_current(run_id) {
                tracing::info!(
                    skipped_batches = batch_count - index,
                    "Sync run cancelled; remaining items stay queued"
                );
                report.cancelled = true;
                break;
            }

            self.process_batch(batch, options, &mut report.counters, &mut report.resolved)
                .await?;
            tracing::debug!(batch = index + 1, of = batch_count, "Processed sync batch");

            if let Some(on_progress) = &options.on_progress {
                on_progress(&self.get_stats().merged_with(report.counters));
            }
        }

        let stats = {
            let mut stats = self.lock_stats();
            *stats = stats.merged_with(report.counters);
            stats.last_sync_at = Some(unix_timestamp_millis());
            *stats
        };
        report.folded = true;
        self.store.save_stats(&stats).await?;

        let remaining = self.load_items().await?;
        *self.lock_queue() = remaining;
        Ok(stats)
    }

    /// Keep counters from a run that aborted part way through
    async fn fold_partial_progress(&self, counters: RunCounters) {
        let stats = {
            let mut stats = self.lock_stats();
            *stats = stats.merged_with(counters);
            *stats
        };
        if let Err(error) = self.store.save_stats(&stats).await {
            tracing::warn!("Failed to persist partial sync stats: {error}");
        }
    }

    /// Best-effort rebuild of the live queue after an aborted run
    async fn refresh_queue(&self) {
        match self.load_items().await {
            Ok(items) => *self.lock_queue() = items,
            Err(error) => tracing::warn!("Failed to refresh sync queue after abort: {error}"),
        }
    }

    /// Rebuild the sorted queue from every persisted queue item
    async fn load_items(&self) -> Result<Vec<QueueItem>> {
        let keys = self.store.list_keys().await?;
        let mut items = Vec::with_capacity(keys.len());

        for key in keys.iter().filter(|key| is_queue_key(key)) {
            match self.store.get(key).await {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(Error::Serialization(error)) => {
                    tracing::warn!("Skipping unreadable queue item {key}: {error}");
                }
                Err(error) => return Err(error),
            }
        }

        sort_for_sync(&mut items);
        Ok(items)
    }

    fn is_current(&self, run_id: u64) -> bool {
        self.active_run.load(Ordering::SeqCst) == run_id
    }

    fn lock_queue(&self) -> MutexGuard<'_, Vec<QueueItem>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_stats(&self) -> MutexGuard<'_, SyncStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
