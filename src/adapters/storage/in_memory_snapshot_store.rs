//! In-Memory Snapshot Store Adapter
//!
//! Keeps snapshots in a map. Useful for testing and single-process use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::ConversationSnapshot;
use crate::domain::foundation::ConversationId;
use crate::ports::{SnapshotStore, SnapshotStoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Arc<RwLock<HashMap<ConversationId, ConversationSnapshot>>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored snapshots
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }

    /// Clear all stored snapshots (useful for tests)
    pub async fn clear(&self) {
        self.snapshots.write().await.clear();
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, snapshot: &ConversationSnapshot) -> Result<(), SnapshotStoreError> {
        self.snapshots
            .write()
            .await
            .insert(snapshot.conversation_id, snapshot.clone());
        Ok(())
    }

    async fn load(
        &self,
        conversation_id: ConversationId,
    ) -> Result<ConversationSnapshot, SnapshotStoreError> {
        self.snapshots
            .read()
            .await
            .get(&conversation_id)
            .cloned()
            .ok_or(SnapshotStoreError::NotFound(conversation_id))
    }

    async fn exists(&self, conversation_id: ConversationId) -> Result<bool, SnapshotStoreError> {
        Ok(self.snapshots.read().await.contains_key(&conversation_id))
    }

    async fn delete(&self, conversation_id: ConversationId) -> Result<(), SnapshotStoreError> {
        self.snapshots.write().await.remove(&conversation_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::{DecisionEngine, Orchestrator};
    use crate::domain::foundation::TenantId;

    fn test_snapshot() -> ConversationSnapshot {
        let engine = DecisionEngine::with_defaults().unwrap();
        Orchestrator::start(engine, ConversationId::new(), TenantId::new("acme").unwrap())
            .unwrap()
            .snapshot()
            .unwrap()
    }

    #[tokio::test]
    async fn save_load_delete() {
        let store = InMemorySnapshotStore::new();
        let snapshot = test_snapshot();
        let id = snapshot.conversation_id;

        store.save(&snapshot).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.load(id).await.unwrap(), snapshot);

        store.delete(id).await.unwrap();
        assert!(store.is_empty().await);
        assert!(matches!(store.load(id).await, Err(SnapshotStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let store = InMemorySnapshotStore::new();
        let other = store.clone();
        let snapshot = test_snapshot();

        store.save(&snapshot).await.unwrap();

        assert!(other.exists(snapshot.conversation_id).await.unwrap());
    }
}
