//! File-based Snapshot Store Adapter
//!
//! Stores one YAML snapshot per conversation, under a directory named
//! after the conversation id.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::conversation::ConversationSnapshot;
use crate::domain::foundation::ConversationId;
use crate::ports::{SnapshotStore, SnapshotStoreError};

const SNAPSHOT_FILE: &str = "snapshot.yaml";

/// File-based storage for conversation snapshots
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    base_path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSnapshotStore::new("./data/conversations");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn conversation_dir(&self, conversation_id: ConversationId) -> PathBuf {
        self.base_path.join(conversation_id.to_string())
    }

    fn snapshot_path(&self, conversation_id: ConversationId) -> PathBuf {
        self.conversation_dir(conversation_id).join(SNAPSHOT_FILE)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, snapshot: &ConversationSnapshot) -> Result<(), SnapshotStoreError> {
        let dir = self.conversation_dir(snapshot.conversation_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;

        let yaml = serde_yaml::to_string(snapshot)
            .map_err(|e| SnapshotStoreError::SerializationFailed(e.to_string()))?;

        // Write beside the target and rename so readers never see a partial file.
        let path = self.snapshot_path(snapshot.conversation_id);
        let staging = path.with_extension("yaml.tmp");
        fs::write(&staging, yaml)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;
        fs::rename(&staging, &path)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;

        tracing::debug!(
            conversation_id = %snapshot.conversation_id,
            path = %path.display(),
            "snapshot saved"
        );
        Ok(())
    }

    async fn load(
        &self,
        conversation_id: ConversationId,
    ) -> Result<ConversationSnapshot, SnapshotStoreError> {
        let path = self.snapshot_path(conversation_id);
        if !path.exists() {
            return Err(SnapshotStoreError::NotFound(conversation_id));
        }

        let yaml = fs::read_to_string(&path)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;

        serde_yaml::from_str(&yaml).map_err(|e| SnapshotStoreError::DeserializationFailed(e.to_string()))
    }

    async fn exists(&self, conversation_id: ConversationId) -> Result<bool, SnapshotStoreError> {
        Ok(self.snapshot_path(conversation_id).exists())
    }

    async fn delete(&self, conversation_id: ConversationId) -> Result<(), SnapshotStoreError> {
        let dir = self.conversation_dir(conversation_id);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;
        }
        Ok(())
    }
}
