//! Options and hooks for a single sync run

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{DEFAULT_BATCH_SIZE, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY_MS};
use crate::error::Error;
use crate::models::{ConflictResolution, ConflictStrategy, SyncConflict, SyncStats};

/// Callback receiving stats snapshots
pub type StatsHook = Box<dyn Fn(&SyncStats) + Send + Sync>;

/// Callback receiving run-level errors
pub type ErrorHook = Box<dyn Fn(&Error) + Send + Sync>;

/// Decides the outcome of a conflict under the `manual` strategy.
///
/// Returning `None` leaves the conflict unresolved and the item failed.
#[async_trait]
pub trait ConflictResolver: Send + Sync {
    async fn resolve(&self, conflict: &SyncConflict) -> Option<ConflictResolution>;
}

#[async_trait]
impl<F, Fut> ConflictResolver for F
where
    F: Fn(SyncConflict) -> Fut + Send + Sync,
    Fut: Future<Output = Option<ConflictResolution>> + Send + 'static,
{
    async fn resolve(&self, conflict: &SyncConflict) -> Option<ConflictResolution> {
        (self)(conflict.clone()).await
    }
}

/// Options for [`super::SyncQueue::start_sync`]
pub struct SyncOptions {
    /// Maximum items per batch; 0 is treated as 1
    pub batch_size: usize,
    /// Retry budget per item. Failed items are retried by later runs, never
    /// within the run that failed them; items past the budget are logged.
    pub retry_count: u32,
    /// Delay between in-run retries; unused while retries happen across runs
    pub retry_delay: Duration,
    pub conflict_strategy: ConflictStrategy,
    pub on_progress: Option<StatsHook>,
    pub on_complete: Option<StatsHook>,
    pub on_error: Option<ErrorHook>,
    /// Required when `conflict_strategy` is `manual`
    pub on_conflict: Option<Arc<dyn ConflictResolver>>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            conflict_strategy: ConflictStrategy::ClientWins,
            on_progress: None,
            on_complete: None,
            on_error: None,
            on_conflict: None,
        }
    }
}

impl fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("batch_size", &self.batch_size)
            .field("retry_count", &self.retry_count)
            .field("retry_delay", &self.retry_delay)
            .field("conflict_strategy", &self.conflict_strategy)
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_conflict", &self.on_conflict.is_some())
            .finish()
    }
}

impl SyncOptions {
    #[must_use]
    pub const fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub const fn retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    #[must_use]
    pub const fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    #[must_use]
    pub const fn conflict_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.conflict_strategy = strategy;
        self
    }

    #[must_use]
    pub fn on_progress(mut self, hook: impl Fn(&SyncStats) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_complete(mut self, hook: impl Fn(&SyncStats) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_error(mut self, hook: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_conflict(mut self, resolver: impl ConflictResolver + 'static) -> Self {
        self.on_conflict = Some(Arc::new(resolver));
        self
    }

    pub(crate) const fn effective_batch_size(&self) -> usize {
        if self.batch_size == 0 {
            1
        } else {
            self.batch_size
        }
    }
}
