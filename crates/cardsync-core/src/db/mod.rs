//! Database layer for cardsync

mod connection;
mod migrations;
mod queue_store;

pub use connection::Database;
pub use queue_store::LibSqlQueueStore;
