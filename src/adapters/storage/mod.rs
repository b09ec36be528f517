//! Storage Adapters
//!
//! Implementations of the SnapshotStore port.
//!
//! - **FileSnapshotStore** - One YAML file per conversation on disk
//! - **InMemorySnapshotStore** - Snapshots in memory (testing/development)

mod file_snapshot_store;
mod in_memory_snapshot_store;

pub use file_snapshot_store::FileSnapshotStore;
pub use in_memory_snapshot_store::InMemorySnapshotStore;
