//! Snapshot Store Port - Interface for persisting conversation snapshots.
//!
//! Stores are keyed by conversation only. Tenant and flow binding is
//! enforced when a snapshot is restored, not when it is loaded.

use async_trait::async_trait;

use crate::domain::conversation::ConversationSnapshot;
use crate::domain::foundation::ConversationId;

/// Errors that can occur during snapshot storage operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotStoreError {
    #[error("Snapshot not found for conversation: {0}")]
    NotFound(ConversationId),

    #[error("Failed to serialize snapshot: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize snapshot: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting and loading conversation snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Save a snapshot, replacing any previous one for the conversation.
    ///
    /// # Errors
    /// Returns `SnapshotStoreError` if the snapshot cannot be written
    async fn save(&self, snapshot: &ConversationSnapshot) -> Result<(), SnapshotStoreError>;

    /// Load the latest snapshot of a conversation
    ///
    /// # Errors
    /// Returns `SnapshotStoreError::NotFound` if no snapshot exists
    async fn load(
        &self,
        conversation_id: ConversationId,
    ) -> Result<ConversationSnapshot, SnapshotStoreError>;

    /// Check if a snapshot exists for a conversation
    async fn exists(&self, conversation_id: ConversationId) -> Result<bool, SnapshotStoreError>;

    /// Delete the snapshot of a conversation. Deleting a missing snapshot
    /// is not an error.
    async fn delete(&self, conversation_id: ConversationId) -> Result<(), SnapshotStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_conversation() {
        let id = ConversationId::new();
        let err = SnapshotStoreError::NotFound(id);
        assert!(err.to_string().contains("Snapshot not found"));
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn serialization_error_mentions_serialize() {
        let err = SnapshotStoreError::SerializationFailed("bad yaml".to_string());
        assert!(err.to_string().contains("serialize"));
    }
}
