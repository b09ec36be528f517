//! Read-only per-turn evaluation context.

use serde_json::Value;

use crate::domain::circular_flow::CircularFlowManager;
use crate::domain::conversation::{CollectedData, DataMap};
use crate::domain::engine::EngineLimits;
use crate::domain::flow::FlowConfig;
use crate::domain::foundation::{ConversationId, Intent, Phase, StateName};
use crate::domain::intent::{IntentCategory, IntentHistoryTracker};

use super::ExternalSignals;

/// Immutable snapshot of everything a condition or knowledge source may
/// look at during one turn.
///
/// Built by the orchestrator after the turn's intent has been recorded, so
/// `history` already includes it. Everything is borrowed; nothing here can
/// mutate the conversation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub conversation_id: ConversationId,
    pub flow: &'a FlowConfig,
    pub state: &'a StateName,
    pub phase: &'a Phase,
    pub intent: &'a Intent,
    pub category: IntentCategory,
    pub collected_data: &'a CollectedData,
    /// Fields extracted from this turn's message.
    pub extracted_data: &'a DataMap,
    /// 1-based index of the current turn.
    pub turn: u32,
    /// Turns completed in `state` since it was entered, not counting the
    /// turn that entered it.
    pub turns_in_state: u32,
    pub last_action: Option<&'a str>,
    pub state_before_objection: Option<&'a StateName>,
    pub history: &'a IntentHistoryTracker,
    pub circular_flow: &'a CircularFlowManager,
    pub signals: &'a ExternalSignals,
    pub limits: &'a EngineLimits,
}

impl<'a> EvaluationContext<'a> {
    /// Value of a field, preferring this turn's extraction over collected data.
    pub fn data(&self, key: &str) -> Option<&'a Value> {
        self.extracted_data
            .get(key)
            .filter(|v| !v.is_null())
            .or_else(|| self.collected_data.get(key))
    }

    /// True if the field is known from collected data or this turn's extraction.
    pub fn has_data(&self, key: &str) -> bool {
        self.collected_data.has(key)
            || self
                .extracted_data
                .get(key)
                .map(|v| match v {
                    Value::Null => false,
                    Value::String(s) => !s.trim().is_empty(),
                    _ => true,
                })
                .unwrap_or(false)
    }

    /// True if every field the current state requires is known.
    pub fn required_data_complete(&self) -> bool {
        self.flow
            .required_data(self.state)
            .iter()
            .all(|field| self.has_data(field))
    }

    pub fn is_final_state(&self) -> bool {
        self.flow.is_final(self.state)
    }

    pub fn in_objection_handling(&self) -> bool {
        self.flow.is_objection_handling(self.state)
    }

    /// Objections in a row, including this turn.
    pub fn consecutive_objections(&self) -> u32 {
        self.history.category_consecutive(IntentCategory::Objection)
    }

    pub fn total_objections(&self) -> u32 {
        self.history.category_total(IntentCategory::Objection)
    }

    /// True once either objection limit from the engine limits is reached.
    pub fn objection_limit_reached(&self) -> bool {
        self.consecutive_objections() >= self.limits.max_consecutive_objections
            || self.total_objections() >= self.limits.max_total_objections
    }
}
