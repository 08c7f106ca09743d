pub mod common;
pub mod completions;
pub mod config;
pub mod enqueue;
pub mod list;
pub mod stats;
pub mod sync;
