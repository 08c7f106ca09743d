//! cardsync-core - Offline sync queue for trading card drafts and edits
//!
//! This crate contains the queue engine, its persistence layer (in-memory and
//! libSQL stores), the HTTP sync endpoint, and the shared models used by the
//! `cardsync` CLI and any embedding host.

pub mod config;
pub mod db;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod queue;
pub mod state;
pub mod store;
pub mod util;

pub use config::SyncSettings;
pub use endpoint::{ApplyOutcome, HttpSyncEndpoint, SyncEndpoint};
pub use error::{Error, Result};
pub use models::{
    ConflictResolution, ConflictStrategy, QueueItem, QueueItemDraft, ResolvedConflict,
    SyncConflict, SyncStats, SyncStatus,
};
pub use queue::{ConflictResolver, SyncOptions, SyncQueue, SyncResult};
pub use state::SyncState;
pub use store::{ItemStore, MemoryStore, StatsStore};
