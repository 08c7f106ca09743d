//! Sync run results

use crate::error::Error;
use crate::models::{ResolvedConflict, SyncStats};

/// Outcome of [`super::SyncQueue::start_sync`]
#[derive(Debug)]
pub struct SyncResult {
    /// `true` iff the run failed no items and raised no run-level error
    pub success: bool,
    /// Stats after the run
    pub stats: SyncStats,
    /// Run-level errors (re-entrancy rejection, store failures)
    pub errors: Vec<Error>,
    /// Conflicts that ended with their item synced, with the final data
    pub resolved: Vec<ResolvedConflict>,
    /// The run was cancelled and skipped its remaining batches
    pub cancelled: bool,
}

impl SyncResult {
    pub(super) fn rejected(stats: SyncStats) -> Self {
        Self {
            success: false,
            stats,
            errors: vec![Error::SyncInProgress],
            resolved: Vec::new(),
            cancelled: false,
        }
    }

    /// Whether the run was refused because another run was active
    pub fn is_rejected(&self) -> bool {
        self.errors
            .iter()
            .any(|error| matches!(error, Error::SyncInProgress))
    }
}
