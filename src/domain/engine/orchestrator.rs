//! Per-conversation turn processing.
//!
//! Each turn runs the same fixed sequence: record the intent, build the
//! evaluation context, collect proposals, resolve them, apply the result
//! atomically, then commit any deferred go-back that actually happened.

use crate::domain::circular_flow::CircularFlowManager;
use crate::domain::conditions::EvaluationContext;
use crate::domain::conversation::{
    ConversationSnapshot, ConversationState, RestorationError, SnapshotEncodingError, StateChange,
    TransitionError, TransitionReport,
};
use crate::domain::decision::{PendingGoBack, ResolvedDecision};
use crate::domain::foundation::{ConversationId, StateName, TenantId};
use crate::domain::intent::IntentHistoryTracker;
use crate::domain::sources::{GO_BACK_ACTION, HANDOFF_ACTION};

use super::decision_engine::DecisionEngine;
use super::turn::{TurnInput, TurnOutcome};

pub const REASON_INVALID_TRANSITION: &str = "invalid_transition";
pub const REASON_GO_BACK_NOT_APPLIED: &str = "go_back_not_applied";

/// Drives one conversation against a shared [`DecisionEngine`].
///
/// Owns the conversation state, the intent history and the go-back
/// ledger; nothing else mutates them.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    engine: DecisionEngine,
    conversation: ConversationState,
    history: IntentHistoryTracker,
    circular_flow: CircularFlowManager,
}

impl Orchestrator {
    pub fn start(
        engine: DecisionEngine,
        conversation_id: ConversationId,
        tenant_id: TenantId,
    ) -> Result<Self, TransitionError> {
        let conversation = ConversationState::start(conversation_id, tenant_id, engine.flow())?;
        let history = IntentHistoryTracker::new(engine.limits().history_capacity);
        let circular_flow =
            CircularFlowManager::for_flow(engine.flow(), engine.limits().go_back_budget);

        tracing::info!(
            conversation_id = %conversation_id,
            tenant_id = %conversation.tenant_id(),
            flow = %engine.flow().name,
            state = %conversation.state(),
            "conversation started"
        );

        Ok(Self {
            engine,
            conversation,
            history,
            circular_flow,
        })
    }

    /// Resumes a conversation from a snapshot. A refused snapshot leaves
    /// nothing behind; the caller decides whether to start fresh.
    pub fn restore(
        engine: DecisionEngine,
        snapshot: ConversationSnapshot,
        conversation_id: ConversationId,
        tenant_id: &TenantId,
    ) -> Result<Self, RestorationError> {
        let restored = snapshot
            .restore(conversation_id, tenant_id, engine.flow())
            .map_err(|e| {
                tracing::warn!(
                    conversation_id = %conversation_id,
                    tenant_id = %tenant_id,
                    error = %e,
                    "snapshot restoration refused"
                );
                e
            })?;

        Ok(Self {
            engine,
            conversation: restored.state,
            history: restored.history,
            circular_flow: restored.circular_flow,
        })
    }

    pub fn snapshot(&self) -> Result<ConversationSnapshot, SnapshotEncodingError> {
        ConversationSnapshot::capture(&self.conversation, &self.history, &self.circular_flow)
    }

    /// Back to the entry state with empty history and a fresh go-back budget.
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        self.conversation.reset(self.engine.flow())?;
        self.history.clear();
        self.circular_flow.reset();
        Ok(())
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn history(&self) -> &IntentHistoryTracker {
        &self.history
    }

    pub fn circular_flow(&self) -> &CircularFlowManager {
        &self.circular_flow
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Processes one user turn.
    ///
    /// Source failures never fail the turn. The only error is a current
    /// state that has vanished from the flow, which validated engines and
    /// restored snapshots rule out.
    pub fn process_turn(&mut self, input: TurnInput) -> Result<TurnOutcome, TransitionError> {
        let TurnInput {
            intent,
            extracted_data,
            signals,
        } = input;
        let conversation_id = self.conversation.conversation_id();
        let turn = self.conversation.turn() + 1;

        let record = self
            .history
            .record(intent.clone(), self.conversation.state().clone());

        let mut decision = {
            let ctx = EvaluationContext {
                conversation_id,
                flow: self.engine.flow(),
                state: self.conversation.state(),
                phase: self.conversation.phase(),
                intent: &intent,
                category: record.category,
                collected_data: self.conversation.collected_data(),
                extracted_data: &extracted_data,
                turn,
                turns_in_state: self.conversation.turns_in_state(),
                last_action: self.conversation.last_action(),
                state_before_objection: self.conversation.state_before_objection(),
                history: &self.history,
                circular_flow: &self.circular_flow,
                signals: &signals,
                limits: self.engine.limits(),
            };
            let output = self.engine.sources().invoke(&ctx);
            let mut decision = self
                .engine
                .resolver()
                .resolve(output.proposals, ctx.flow, ctx.state);
            decision.trace.source_failures = output.failures;
            decision
        };

        let report = self.apply(&mut decision)?;

        let go_back_committed = match decision.deferred_go_back.take() {
            Some(pending) => {
                self.commit_go_back(&pending, &report.previous_state, turn, &mut decision)
            }
            None => false,
        };

        let is_final = self.conversation.is_final(self.engine.flow());
        if decision.action == HANDOFF_ACTION {
            tracing::info!(
                conversation_id = %conversation_id,
                state = %self.conversation.state(),
                "handed off to a human"
            );
        }
        if is_final && report.state_changed {
            tracing::info!(
                conversation_id = %conversation_id,
                state = %self.conversation.state(),
                turn,
                "conversation reached a final state"
            );
        }
        tracing::debug!(
            conversation_id = %conversation_id,
            turn,
            intent = %intent,
            action = %decision.action,
            from = %report.previous_state,
            to = %self.conversation.state(),
            "turn processed"
        );

        Ok(TurnOutcome {
            conversation_id,
            turn,
            action: decision.action,
            previous_state: report.previous_state,
            state: self.conversation.state().clone(),
            phase: self.conversation.phase().clone(),
            state_changed: report.state_changed,
            phase_changed: report.phase_changed,
            data: self.conversation.collected_data().as_map().clone(),
            changed_keys: report.changed_keys,
            is_final,
            go_back_committed,
            trace: decision.trace,
        })
    }

    /// Applies the decision. A rejected target degrades to staying put with
    /// the same action and data.
    fn apply(
        &mut self,
        decision: &mut ResolvedDecision,
    ) -> Result<TransitionReport, TransitionError> {
        let change = StateChange {
            next_state: decision.next_state.target().cloned(),
            action: decision.action.clone(),
            data_updates: decision.data_updates.clone(),
        };

        match self.conversation.transition(self.engine.flow(), change) {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::warn!(
                    conversation_id = %self.conversation.conversation_id(),
                    state = %self.conversation.state(),
                    error = %e,
                    "transition rejected, staying in current state"
                );
                decision.trace.add_reason(REASON_INVALID_TRANSITION);
                let stay = StateChange::stay(decision.action.clone())
                    .with_data(decision.data_updates.clone());
                self.conversation.transition(self.engine.flow(), stay)
            }
        }
    }

    /// Spends go-back budget only when go-back won and was actually applied.
    fn commit_go_back(
        &mut self,
        pending: &PendingGoBack,
        previous_state: &StateName,
        turn: u32,
        decision: &mut ResolvedDecision,
    ) -> bool {
        let applied = decision.action == GO_BACK_ACTION
            && previous_state == &pending.from
            && self.conversation.state() == &pending.to;
        if !applied {
            decision.trace.add_reason(REASON_GO_BACK_NOT_APPLIED);
            return false;
        }
        match self.circular_flow.record_go_back(&pending.from, &pending.to, turn) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    conversation_id = %self.conversation.conversation_id(),
                    error = %e,
                    "go-back applied but could not be committed"
                );
                false
            }
        }
    }
}
