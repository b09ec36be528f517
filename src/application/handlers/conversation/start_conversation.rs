//! StartConversationHandler - Command handler for starting conversations.

use std::sync::Arc;

use crate::domain::engine::{DecisionEngine, Orchestrator};
use crate::domain::foundation::{ConversationId, DomainError, ErrorCode, Phase, StateName, TenantId};
use crate::ports::SnapshotStore;

/// Command to start a conversation.
#[derive(Debug, Clone)]
pub struct StartConversationCommand {
    pub tenant_id: TenantId,
    /// Caller-chosen id; a new one is generated when absent.
    pub conversation_id: Option<ConversationId>,
}

/// Result of a started conversation.
#[derive(Debug, Clone)]
pub struct StartConversationResult {
    pub conversation_id: ConversationId,
    pub state: StateName,
    pub phase: Phase,
}

/// Handler for starting conversations.
pub struct StartConversationHandler {
    engine: DecisionEngine,
    store: Arc<dyn SnapshotStore>,
}

impl StartConversationHandler {
    pub fn new(engine: DecisionEngine, store: Arc<dyn SnapshotStore>) -> Self {
        Self { engine, store }
    }

    pub async fn handle(
        &self,
        cmd: StartConversationCommand,
    ) -> Result<StartConversationResult, DomainError> {
        let conversation_id = cmd.conversation_id.unwrap_or_default();

        if self.store.exists(conversation_id).await? {
            return Err(DomainError::new(
                ErrorCode::ConversationAlreadyExists,
                format!("Conversation already exists: {conversation_id}"),
            ));
        }

        let orchestrator = Orchestrator::start(self.engine.clone(), conversation_id, cmd.tenant_id)?;
        self.store.save(&orchestrator.snapshot()?).await?;

        let conversation = orchestrator.conversation();
        Ok(StartConversationResult {
            conversation_id,
            state: conversation.state().clone(),
            phase: conversation.phase().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySnapshotStore;

    fn handler(store: InMemorySnapshotStore) -> StartConversationHandler {
        StartConversationHandler::new(DecisionEngine::with_defaults().unwrap(), Arc::new(store))
    }

    #[tokio::test]
    async fn starts_in_entry_state_and_persists() {
        let store = InMemorySnapshotStore::new();
        let result = handler(store.clone())
            .handle(StartConversationCommand {
                tenant_id: TenantId::new("acme").unwrap(),
                conversation_id: None,
            })
            .await
            .unwrap();

        assert_eq!(result.state, StateName::from("greeting"));
        assert!(store.exists(result.conversation_id).await.unwrap());
    }

    #[tokio::test]
    async fn existing_conversation_is_rejected() {
        let store = InMemorySnapshotStore::new();
        let handler = handler(store);
        let cmd = StartConversationCommand {
            tenant_id: TenantId::new("acme").unwrap(),
            conversation_id: Some(ConversationId::new()),
        };

        handler.handle(cmd.clone()).await.unwrap();
        let err = handler.handle(cmd).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ConversationAlreadyExists);
    }
}
