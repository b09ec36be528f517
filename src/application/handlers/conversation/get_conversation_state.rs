//! GetConversationStateHandler - Query handler for a conversation's state.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::conversation::DataMap;
use crate::domain::engine::{DecisionEngine, Orchestrator};
use crate::domain::foundation::{ConversationId, DomainError, Phase, StateName, TenantId};
use crate::ports::SnapshotStore;

use super::errors::{conversation_not_found, is_identity_mismatch};

/// Query to get a conversation's current state.
#[derive(Debug, Clone)]
pub struct GetConversationStateQuery {
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
}

/// Read model of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationView {
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
    pub state: StateName,
    pub phase: Phase,
    pub turn: u32,
    pub last_action: Option<String>,
    pub collected_data: DataMap,
    pub is_final: bool,
    pub go_backs_used: u32,
    pub go_back_budget: u32,
}

pub struct GetConversationStateHandler {
    engine: DecisionEngine,
    store: Arc<dyn SnapshotStore>,
}

impl GetConversationStateHandler {
    pub fn new(engine: DecisionEngine, store: Arc<dyn SnapshotStore>) -> Self {
        Self { engine, store }
    }

    /// Unlike turn processing, a snapshot that cannot be restored is an error here.
    /// A snapshot owned by another tenant reads as not found.
    pub async fn handle(&self, query: GetConversationStateQuery) -> Result<ConversationView, DomainError> {
        let snapshot = self.store.load(query.conversation_id).await?;
        let orchestrator = Orchestrator::restore(
            self.engine.clone(),
            snapshot,
            query.conversation_id,
            &query.tenant_id,
        )
        .map_err(|e| {
            if is_identity_mismatch(&e) {
                conversation_not_found(query.conversation_id)
            } else {
                e.into()
            }
        })?;

        let conversation = orchestrator.conversation();
        Ok(ConversationView {
            conversation_id: conversation.conversation_id(),
            tenant_id: conversation.tenant_id().clone(),
            state: conversation.state().clone(),
            phase: conversation.phase().clone(),
            turn: conversation.turn(),
            last_action: conversation.last_action().map(str::to_string),
            collected_data: conversation.collected_data().as_map().clone(),
            is_final: conversation.is_final(self.engine.flow()),
            go_backs_used: orchestrator.circular_flow().used(),
            go_back_budget: orchestrator.circular_flow().budget(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySnapshotStore;
    use crate::domain::engine::TurnInput;
    use crate::domain::foundation::ErrorCode;

    async fn stored_conversation(store: &InMemorySnapshotStore) -> ConversationId {
        let engine = DecisionEngine::with_defaults().unwrap();
        let id = ConversationId::new();
        let mut orchestrator = Orchestrator::start(engine, id, TenantId::new("acme").unwrap()).unwrap();
        orchestrator.process_turn(TurnInput::new("greeting")).unwrap();
        store.save(&orchestrator.snapshot().unwrap()).await.unwrap();
        id
    }

    fn handler(store: &InMemorySnapshotStore) -> GetConversationStateHandler {
        GetConversationStateHandler::new(DecisionEngine::with_defaults().unwrap(), Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn returns_current_state() {
        let store = InMemorySnapshotStore::new();
        let id = stored_conversation(&store).await;

        let view = handler(&store)
            .handle(GetConversationStateQuery {
                conversation_id: id,
                tenant_id: TenantId::new("acme").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(view.state, StateName::from("situation"));
        assert_eq!(view.turn, 1);
        assert_eq!(view.last_action.as_deref(), Some("greet_and_introduce"));
        assert_eq!(view.go_back_budget, 2);
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let store = InMemorySnapshotStore::new();
        let err = handler(&store)
            .handle(GetConversationStateQuery {
                conversation_id: ConversationId::new(),
                tenant_id: TenantId::new("acme").unwrap(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ConversationNotFound);
    }

    #[tokio::test]
    async fn other_tenant_sees_nothing() {
        let store = InMemorySnapshotStore::new();
        let id = stored_conversation(&store).await;

        let err = handler(&store)
            .handle(GetConversationStateQuery {
                conversation_id: id,
                tenant_id: TenantId::new("globex").unwrap(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ConversationNotFound);
    }
}
