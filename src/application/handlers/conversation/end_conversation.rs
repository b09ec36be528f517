//! EndConversationHandler - Command handler for ending conversations.

use std::sync::Arc;

use crate::domain::foundation::{ConversationId, DomainError, TenantId};
use crate::ports::SnapshotStore;

use super::errors::conversation_not_found;

#[derive(Debug, Clone)]
pub struct EndConversationCommand {
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
}

/// Handler for ending conversations. Ending removes the stored snapshot;
/// the audit log is kept.
pub struct EndConversationHandler {
    store: Arc<dyn SnapshotStore>,
}

impl EndConversationHandler {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: EndConversationCommand) -> Result<(), DomainError> {
        let snapshot = self.store.load(cmd.conversation_id).await?;
        if snapshot.tenant_id != cmd.tenant_id {
            return Err(conversation_not_found(cmd.conversation_id));
        }

        self.store.delete(cmd.conversation_id).await?;
        tracing::info!(
            conversation_id = %cmd.conversation_id,
            tenant_id = %cmd.tenant_id,
            turns = snapshot.payload.conversation.turn(),
            "conversation ended"
        );
        Ok(())
    }
}
