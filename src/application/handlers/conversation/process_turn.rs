//! ProcessTurnHandler - Command handler for one conversation turn.
//!
//! Loads and restores the conversation, runs the turn, persists the new
//! snapshot and records the decision. A snapshot that cannot be restored is
//! never partially used: the conversation starts fresh instead. A snapshot
//! owned by another tenant is reported as not found and left untouched.
//!
//! Turns for one conversation are processed strictly one at a time; turns
//! for different conversations run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::engine::{DecisionEngine, Orchestrator, TurnInput, TurnOutcome};
use crate::domain::foundation::{ConversationId, DomainError, TenantId};
use crate::ports::{AuditEntry, DecisionAuditLog, SnapshotStore, SnapshotStoreError};

use super::errors::{conversation_not_found, is_identity_mismatch};

/// Command to process one user turn.
#[derive(Debug, Clone)]
pub struct ProcessTurnCommand {
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
    pub input: TurnInput,
}

#[derive(Debug, Clone)]
pub struct ProcessTurnResult {
    pub outcome: TurnOutcome,
    /// True if no usable snapshot existed and the conversation was started
    /// fresh for this turn.
    pub restarted: bool,
}

/// Handler for processing turns.
pub struct ProcessTurnHandler {
    engine: DecisionEngine,
    store: Arc<dyn SnapshotStore>,
    audit_log: Arc<dyn DecisionAuditLog>,
    /// One lock per conversation with a turn in flight; held across
    /// load, process and save.
    turn_locks: Mutex<HashMap<ConversationId, Arc<Mutex<()>>>>,
}

impl ProcessTurnHandler {
    pub fn new(
        engine: DecisionEngine,
        store: Arc<dyn SnapshotStore>,
        audit_log: Arc<dyn DecisionAuditLog>,
    ) -> Self {
        Self {
            engine,
            store,
            audit_log,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn handle(&self, cmd: ProcessTurnCommand) -> Result<ProcessTurnResult, DomainError> {
        let conversation_id = cmd.conversation_id;
        let lock = self.acquire_turn_lock(conversation_id).await;

        let result = {
            let _turn = lock.lock().await;
            self.process(cmd).await
        };

        self.release_turn_lock(conversation_id, lock).await;
        result
    }

    async fn acquire_turn_lock(&self, conversation_id: ConversationId) -> Arc<Mutex<()>> {
        self.turn_locks
            .lock()
            .await
            .entry(conversation_id)
            .or_default()
            .clone()
    }

    /// Drops the conversation's lock entry once no other turn is waiting on it.
    async fn release_turn_lock(&self, conversation_id: ConversationId, lock: Arc<Mutex<()>>) {
        let mut locks = self.turn_locks.lock().await;
        drop(lock);
        let idle = locks
            .get(&conversation_id)
            .map(|l| Arc::strong_count(l) == 1)
            .unwrap_or(false);
        if idle {
            locks.remove(&conversation_id);
        }
    }

    async fn process(&self, cmd: ProcessTurnCommand) -> Result<ProcessTurnResult, DomainError> {
        let (mut orchestrator, restarted) = self.load_or_start(&cmd).await?;

        let intent = cmd.input.intent.clone();
        let outcome = orchestrator.process_turn(cmd.input)?;

        self.store.save(&orchestrator.snapshot()?).await?;

        let entry = AuditEntry::from_outcome(cmd.tenant_id, intent, &outcome);
        if let Err(e) = self.audit_log.record(entry).await {
            tracing::warn!(
                conversation_id = %cmd.conversation_id,
                error = %e,
                "failed to record decision audit entry"
            );
        }

        Ok(ProcessTurnResult { outcome, restarted })
    }

    async fn load_or_start(&self, cmd: &ProcessTurnCommand) -> Result<(Orchestrator, bool), DomainError> {
        let snapshot = match self.store.load(cmd.conversation_id).await {
            Ok(snapshot) => Some(snapshot),
            Err(SnapshotStoreError::NotFound(_)) => None,
            Err(SnapshotStoreError::DeserializationFailed(reason)) => {
                tracing::warn!(
                    conversation_id = %cmd.conversation_id,
                    reason = %reason,
                    "stored snapshot is unreadable, starting fresh"
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(snapshot) = snapshot {
            match Orchestrator::restore(
                self.engine.clone(),
                snapshot,
                cmd.conversation_id,
                &cmd.tenant_id,
            ) {
                Ok(orchestrator) => return Ok((orchestrator, false)),
                Err(e) if is_identity_mismatch(&e) => {
                    return Err(conversation_not_found(cmd.conversation_id));
                }
                Err(e) => tracing::warn!(
                    conversation_id = %cmd.conversation_id,
                    error = %e,
                    "starting fresh after refused restoration"
                ),
            }
        }

        let orchestrator = Orchestrator::start(
            self.engine.clone(),
            cmd.conversation_id,
            cmd.tenant_id.clone(),
        )?;
        Ok((orchestrator, true))
    }
}
