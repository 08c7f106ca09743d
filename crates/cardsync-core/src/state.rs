//! Observable sync queue state.

/// Lifecycle state published by a [`crate::queue::SyncQueue`] to subscribers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    /// No run has happened since initialization
    #[default]
    Idle,
    /// A run is in progress
    Syncing,
    /// Last run finished with zero failed items
    Synced,
    /// Last run finished with failures or aborted with an error
    Error,
    /// Active run was cancelled by the host
    Cancelled,
}
