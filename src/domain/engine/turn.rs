//! Turn input and outcome.

use serde::{Deserialize, Serialize};

use crate::domain::conditions::ExternalSignals;
use crate::domain::conversation::DataMap;
use crate::domain::decision::ResolutionTrace;
use crate::domain::foundation::{ConversationId, Intent, Phase, StateName};

/// What the upstream classifier and extractor produced for one user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnInput {
    pub intent: Intent,
    #[serde(default)]
    pub extracted_data: DataMap,
    #[serde(default)]
    pub signals: ExternalSignals,
}

impl TurnInput {
    pub fn new(intent: impl Into<Intent>) -> Self {
        Self {
            intent: intent.into(),
            extracted_data: DataMap::new(),
            signals: ExternalSignals::default(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extracted_data.insert(key.into(), value);
        self
    }

    pub fn with_signals(mut self, signals: ExternalSignals) -> Self {
        self.signals = signals;
        self
    }
}

/// The decision for one turn, after it has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub conversation_id: ConversationId,
    pub turn: u32,
    pub action: String,
    pub previous_state: StateName,
    pub state: StateName,
    pub phase: Phase,
    pub state_changed: bool,
    pub phase_changed: bool,
    /// Collected data after the turn.
    pub data: DataMap,
    pub changed_keys: Vec<String>,
    pub is_final: bool,
    pub go_back_committed: bool,
    pub trace: ResolutionTrace,
}
