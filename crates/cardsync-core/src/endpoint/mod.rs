//! Remote synchronization endpoint contract.

mod http;

pub use http::HttpSyncEndpoint;

use crate::error::Result;
use crate::models::QueueItem;

/// Result of applying one queued item remotely
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The remote system accepted the change
    Applied,
    /// The remote system holds a conflicting concurrent change
    Conflict { server_data: serde_json::Value },
}

/// Remote "apply change" operation (async).
///
/// Any error returned by [`SyncEndpoint::apply`] is treated as a transport
/// failure for that item only.
#[allow(async_fn_in_trait)]
pub trait SyncEndpoint {
    /// Called once per type group before its items are applied.
    ///
    /// An error here fails every item of the group.
    async fn begin_group(&self, item_type: &str, items: &[QueueItem]) -> Result<()> {
        let _ = (item_type, items);
        Ok(())
    }

    /// Apply a single item
    async fn apply(&self, item: &QueueItem) -> Result<ApplyOutcome>;
}
