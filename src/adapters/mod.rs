//! Adapters - Implementations of port interfaces.
//!
//! - `storage` - Snapshot stores (in-memory, YAML files)
//! - `audit` - Decision audit logs

pub mod audit;
pub mod storage;

pub use audit::InMemoryAuditLog;
pub use storage::{FileSnapshotStore, InMemorySnapshotStore};
