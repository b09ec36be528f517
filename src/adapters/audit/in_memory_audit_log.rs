//! In-Memory Decision Audit Log Adapter

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ConversationId;
use crate::ports::{AuditEntry, AuditLogError, DecisionAuditLog};

/// Audit log held in memory.
///
/// Unbounded by default; [`InMemoryAuditLog::with_capacity`] keeps only the
/// most recent entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<VecDeque<AuditEntry>>>,
    capacity: Option<usize>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` entries, evicting the oldest first.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::default(),
            capacity: Some(capacity),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl DecisionAuditLog for InMemoryAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<(), AuditLogError> {
        let mut entries = self.entries.write().await;
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return Ok(());
            }
            while entries.len() >= capacity {
                entries.pop_front();
            }
        }
        entries.push_back(entry);
        Ok(())
    }

    async fn entries_for(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<AuditEntry>, AuditLogError> {
        let mut entries: Vec<AuditEntry> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.conversation_id == conversation_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.turn);
        Ok(entries)
    }
}
