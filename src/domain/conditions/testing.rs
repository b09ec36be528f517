//! Owned fixture for building evaluation contexts in tests.

use serde_json::Value;

use crate::domain::circular_flow::CircularFlowManager;
use crate::domain::conversation::{CollectedData, DataMap};
use crate::domain::engine::EngineLimits;
use crate::domain::flow::FlowConfig;
use crate::domain::foundation::{ConversationId, Intent, Phase, StateName};
use crate::domain::intent::{IntentCategory, IntentHistoryTracker};

use super::{EvaluationContext, ExternalSignals};

pub(crate) struct ContextFixture {
    pub conversation_id: ConversationId,
    pub flow: FlowConfig,
    pub state: StateName,
    pub phase: Phase,
    pub intent: Intent,
    pub collected: CollectedData,
    pub extracted: DataMap,
    pub history: IntentHistoryTracker,
    pub circular: CircularFlowManager,
    pub signals: ExternalSignals,
    pub limits: EngineLimits,
    pub turns_in_state: u32,
    pub last_action: Option<String>,
    pub state_before_objection: Option<StateName>,
}

impl ContextFixture {
    /// A context in `state` of the built-in flow whose current turn
    /// carries `intent`, already recorded in history.
    pub fn new(state: &str, intent: &str) -> Self {
        let flow = FlowConfig::builtin().unwrap();
        Self::with_flow(flow, state, intent)
    }

    pub fn with_flow(flow: FlowConfig, state: &str, intent: &str) -> Self {
        let state = StateName::from(state);
        let phase = flow
            .phase_for(&state)
            .unwrap_or_else(|| Phase::new(state.as_str()));
        let limits = EngineLimits::default();
        let circular = CircularFlowManager::for_flow(&flow, limits.go_back_budget);
        let intent = Intent::from(intent);
        let mut history = IntentHistoryTracker::default();
        history.record(intent.clone(), state.clone());

        Self {
            conversation_id: ConversationId::new(),
            flow,
            state,
            phase,
            intent,
            collected: CollectedData::new(),
            extracted: DataMap::new(),
            history,
            circular,
            signals: ExternalSignals::default(),
            limits,
            turns_in_state: 0,
            last_action: None,
            state_before_objection: None,
        }
    }

    /// Rebuilds history so `intents` precede the current intent.
    pub fn preceded_by(mut self, intents: &[&str]) -> Self {
        let mut history = IntentHistoryTracker::new(self.history.capacity());
        for intent in intents {
            history.record(Intent::from(*intent), self.state.clone());
        }
        history.record(self.intent.clone(), self.state.clone());
        self.history = history;
        self
    }

    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        let mut update = DataMap::new();
        update.insert(key.to_string(), value);
        self.collected.merge(update);
        self
    }

    pub fn with_extracted(mut self, key: &str, value: Value) -> Self {
        self.extracted.insert(key.to_string(), value);
        self
    }

    pub fn with_signals(mut self, signals: ExternalSignals) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_limits(mut self, limits: EngineLimits) -> Self {
        self.circular = CircularFlowManager::for_flow(&self.flow, limits.go_back_budget);
        self.limits = limits;
        self
    }

    pub fn with_turns_in_state(mut self, turns: u32) -> Self {
        self.turns_in_state = turns;
        self
    }

    pub fn with_state_before_objection(mut self, state: &str) -> Self {
        self.state_before_objection = Some(StateName::from(state));
        self
    }

    /// Spends `used` go-backs from the budget.
    pub fn with_go_backs_used(mut self, used: u32) -> Self {
        for turn in 0..used {
            self.circular
                .record_go_back(&StateName::from("problem"), &StateName::from("situation"), turn)
                .unwrap();
        }
        self
    }

    pub fn context(&self) -> EvaluationContext<'_> {
        EvaluationContext {
            conversation_id: self.conversation_id,
            flow: &self.flow,
            state: &self.state,
            phase: &self.phase,
            intent: &self.intent,
            category: IntentCategory::of(&self.intent),
            collected_data: &self.collected,
            extracted_data: &self.extracted,
            turn: self.history.turns_recorded(),
            turns_in_state: self.turns_in_state,
            last_action: self.last_action.as_deref(),
            state_before_objection: self.state_before_objection.as_ref(),
            history: &self.history,
            circular_flow: &self.circular,
            signals: &self.signals,
            limits: &self.limits,
        }
    }
}
