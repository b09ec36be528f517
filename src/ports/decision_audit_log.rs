//! Decision Audit Log Port - records why each turn was decided as it was.
//!
//! Audit entries are write-mostly and never read back by the engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::decision::ResolutionTrace;
use crate::domain::engine::TurnOutcome;
use crate::domain::foundation::{ConversationId, Intent, StateName, TenantId};

#[derive(Debug, thiserror::Error)]
pub enum AuditLogError {
    #[error("Failed to write audit entry: {0}")]
    WriteFailed(String),

    #[error("Failed to read audit entries: {0}")]
    ReadFailed(String),
}

/// One turn's decision, as recorded for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
    pub turn: u32,
    pub intent: Intent,
    pub action: String,
    pub from_state: StateName,
    pub to_state: StateName,
    pub trace: ResolutionTrace,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn from_outcome(tenant_id: TenantId, intent: Intent, outcome: &TurnOutcome) -> Self {
        Self {
            conversation_id: outcome.conversation_id,
            tenant_id,
            turn: outcome.turn,
            intent,
            action: outcome.action.clone(),
            from_state: outcome.previous_state.clone(),
            to_state: outcome.state.clone(),
            trace: outcome.trace.clone(),
            recorded_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait DecisionAuditLog: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), AuditLogError>;

    /// Entries of one conversation in turn order.
    async fn entries_for(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<AuditEntry>, AuditLogError>;
}
