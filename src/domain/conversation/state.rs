//! Conversation state.
//!
//! Owns the current state, its phase, and the collected data. The only way
//! to change any of them is [`ConversationState::transition`], which derives
//! the phase from the target state and applies everything in one step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::flow::FlowConfig;
use crate::domain::foundation::{ConversationId, Phase, StateName, TenantId};

use super::collected_data::{CollectedData, DataMap};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("state '{0}' is not part of the active flow")]
    UnknownState(StateName),
}

/// A requested change, produced from a resolved decision.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    /// `None` means stay in the current state.
    pub next_state: Option<StateName>,
    pub action: String,
    pub data_updates: DataMap,
}

impl StateChange {
    pub fn stay(action: impl Into<String>) -> Self {
        Self {
            next_state: None,
            action: action.into(),
            data_updates: DataMap::new(),
        }
    }

    pub fn goto(target: StateName, action: impl Into<String>) -> Self {
        Self {
            next_state: Some(target),
            action: action.into(),
            data_updates: DataMap::new(),
        }
    }

    pub fn with_data(mut self, updates: DataMap) -> Self {
        self.data_updates = updates;
        self
    }
}

/// What an applied transition did.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionReport {
    pub previous_state: StateName,
    pub previous_phase: Phase,
    pub state_changed: bool,
    pub phase_changed: bool,
    /// Collected-data keys added or overwritten.
    pub changed_keys: Vec<String>,
}

/// Per-conversation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    conversation_id: ConversationId,
    tenant_id: TenantId,
    flow_name: String,
    state: StateName,
    phase: Phase,
    collected_data: CollectedData,
    turn: u32,
    last_action: Option<String>,
    state_before_objection: Option<StateName>,
    turns_in_state: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationState {
    /// Starts a conversation in the flow's entry state.
    pub fn start(
        conversation_id: ConversationId,
        tenant_id: TenantId,
        flow: &FlowConfig,
    ) -> Result<Self, TransitionError> {
        let state = flow.entry_state.clone();
        let phase = flow
            .phase_for(&state)
            .ok_or_else(|| TransitionError::UnknownState(state.clone()))?;
        let now = Utc::now();

        Ok(Self {
            conversation_id,
            tenant_id,
            flow_name: flow.name.clone(),
            state,
            phase,
            collected_data: CollectedData::new(),
            turn: 0,
            last_action: None,
            state_before_objection: None,
            turns_in_state: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    pub fn state(&self) -> &StateName {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn collected_data(&self) -> &CollectedData {
        &self.collected_data
    }

    /// Number of completed turns.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }

    /// The state an objection interrupted, while one is being handled.
    pub fn state_before_objection(&self) -> Option<&StateName> {
        self.state_before_objection.as_ref()
    }

    /// Turns that ended without leaving the current state.
    pub fn turns_in_state(&self) -> u32 {
        self.turns_in_state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_final(&self, flow: &FlowConfig) -> bool {
        flow.is_final(&self.state)
    }

    /// True if the stored phase is the one the flow derives for the state.
    pub fn is_consistent_with(&self, flow: &FlowConfig) -> bool {
        flow.phase_for(&self.state).as_ref() == Some(&self.phase)
    }

    /// Applies a change atomically.
    ///
    /// The target is validated and its phase derived before anything is
    /// touched; on error the state is left exactly as it was.
    pub fn transition(
        &mut self,
        flow: &FlowConfig,
        change: StateChange,
    ) -> Result<TransitionReport, TransitionError> {
        let target = change.next_state.unwrap_or_else(|| self.state.clone());
        let phase = flow
            .phase_for(&target)
            .ok_or_else(|| TransitionError::UnknownState(target.clone()))?;

        let previous_state = std::mem::replace(&mut self.state, target);
        let previous_phase = std::mem::replace(&mut self.phase, phase);
        let state_changed = previous_state != self.state;

        if state_changed {
            if flow.is_objection_handling(&self.state) {
                if !flow.is_objection_handling(&previous_state) {
                    self.state_before_objection = Some(previous_state.clone());
                }
            } else {
                self.state_before_objection = None;
            }
            self.turns_in_state = 0;
        } else {
            self.turns_in_state += 1;
        }

        let changed_keys = self.collected_data.merge(change.data_updates);
        self.last_action = Some(change.action);
        self.turn += 1;
        self.updated_at = Utc::now();

        Ok(TransitionReport {
            phase_changed: previous_phase != self.phase,
            previous_state,
            previous_phase,
            state_changed,
            changed_keys,
        })
    }

    /// Returns the conversation to the flow's entry state with no data.
    pub fn reset(&mut self, flow: &FlowConfig) -> Result<(), TransitionError> {
        let state = flow.entry_state.clone();
        let phase = flow
            .phase_for(&state)
            .ok_or_else(|| TransitionError::UnknownState(state.clone()))?;

        self.state = state;
        self.phase = phase;
        self.collected_data.clear();
        self.turn = 0;
        self.last_action = None;
        self.state_before_objection = None;
        self.turns_in_state = 0;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flow() -> FlowConfig {
        FlowConfig::builtin().unwrap()
    }

    fn started() -> ConversationState {
        ConversationState::start(ConversationId::new(), TenantId::new("acme").unwrap(), &flow()).unwrap()
    }

    fn data(pairs: &[(&str, serde_json::Value)]) -> DataMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    mod start {
        use super::*;

        #[test]
        fn begins_in_entry_state_with_derived_phase() {
            let conversation = started();
            assert_eq!(conversation.state(), &StateName::from("greeting"));
            assert_eq!(conversation.phase(), &Phase::from("opening"));
            assert_eq!(conversation.turn(), 0);
            assert!(conversation.collected_data().is_empty());
        }
    }

    mod transition {
        use super::*;

        #[test]
        fn derives_phase_from_target() {
            let flow = flow();
            let mut conversation = started();
            let report = conversation
                .transition(&flow, StateChange::goto("handle_objection".into(), "acknowledge_objection"))
                .unwrap();

            assert_eq!(conversation.phase(), &Phase::from("objection"));
            assert!(report.state_changed);
            assert!(report.phase_changed);
            assert!(conversation.is_consistent_with(&flow));
        }

        #[test]
        fn staying_keeps_phase_and_counts_dwell() {
            let flow = flow();
            let mut conversation = started();
            conversation
                .transition(&flow, StateChange::stay("greet_and_introduce"))
                .unwrap();
            let report = conversation
                .transition(&flow, StateChange::stay("greet_and_introduce"))
                .unwrap();

            assert!(!report.state_changed);
            assert_eq!(conversation.phase(), &Phase::from("opening"));
            assert_eq!(conversation.turns_in_state(), 2);
            assert_eq!(conversation.turn(), 2);
            assert_eq!(conversation.last_action(), Some("greet_and_introduce"));
        }

        #[test]
        fn unknown_target_leaves_everything_untouched() {
            let flow = flow();
            let mut conversation = started();
            let before = conversation.clone();

            let result = conversation.transition(
                &flow,
                StateChange::goto("nowhere".into(), "teleport").with_data(data(&[("company_size", json!(5))])),
            );

            assert_eq!(result, Err(TransitionError::UnknownState("nowhere".into())));
            assert_eq!(conversation, before);
        }

        #[test]
        fn data_is_merged_in_the_same_step() {
            let flow = flow();
            let mut conversation = started();
            let report = conversation
                .transition(
                    &flow,
                    StateChange::goto("situation".into(), "greet_and_introduce")
                        .with_data(data(&[("company_size", json!(50)), ("budget", serde_json::Value::Null)])),
                )
                .unwrap();

            assert_eq!(report.changed_keys, vec!["company_size".to_string()]);
            assert!(conversation.collected_data().has("company_size"));
            assert!(!conversation.collected_data().has("budget"));
        }
    }

    mod objections {
        use super::*;

        #[test]
        fn entering_objection_handling_remembers_previous_state() {
            let flow = flow();
            let mut conversation = started();
            conversation
                .transition(&flow, StateChange::goto("presentation".into(), "present_solution"))
                .unwrap();
            conversation
                .transition(&flow, StateChange::goto("handle_objection".into(), "acknowledge_objection"))
                .unwrap();

            assert_eq!(
                conversation.state_before_objection(),
                Some(&StateName::from("presentation"))
            );
        }

        #[test]
        fn leaving_objection_handling_clears_it() {
            let flow = flow();
            let mut conversation = started();
            conversation
                .transition(&flow, StateChange::goto("handle_objection".into(), "acknowledge_objection"))
                .unwrap();
            conversation
                .transition(&flow, StateChange::goto("soft_close".into(), "objection_limit_reached"))
                .unwrap();

            assert_eq!(conversation.state_before_objection(), None);
        }
    }

    #[test]
    fn reset_returns_to_entry_and_clears_data() {
        let flow = flow();
        let mut conversation = started();
        conversation
            .transition(
                &flow,
                StateChange::goto("problem".into(), "ask_problem_question")
                    .with_data(data(&[("company_size", json!(50))])),
            )
            .unwrap();

        conversation.reset(&flow).unwrap();

        assert_eq!(conversation.state(), &StateName::from("greeting"));
        assert_eq!(conversation.phase(), &Phase::from("opening"));
        assert!(conversation.collected_data().is_empty());
        assert_eq!(conversation.turn(), 0);
    }

    #[test]
    fn serde_round_trip_is_exact() {
        let flow = flow();
        let mut conversation = started();
        conversation
            .transition(
                &flow,
                StateChange::goto("success".into(), "thank_and_close")
                    .with_data(data(&[("contact_email", json!("a@b.co")), ("company_size", json!(50))])),
            )
            .unwrap();

        let json = serde_json::to_string(&conversation).unwrap();
        let back: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, conversation);
        assert!(back.is_final(&flow));
    }
}
