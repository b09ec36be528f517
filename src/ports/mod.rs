//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SnapshotStore` - Persistence of conversation snapshots
//! - `DecisionAuditLog` - Record of every turn's resolution trace

mod decision_audit_log;
mod snapshot_store;

pub use decision_audit_log::{AuditEntry, AuditLogError, DecisionAuditLog};
pub use snapshot_store::{SnapshotStore, SnapshotStoreError};
