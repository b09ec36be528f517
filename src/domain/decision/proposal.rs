//! Proposals: candidate decisions contributed by knowledge sources.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::conversation::DataMap;
use crate::domain::foundation::StateName;

/// Ordered priority scale. Declaration order is significant: `Critical`
/// outranks `High`, which outranks `Normal`, which outranks `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// What a proposal wants to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    Action,
    Transition,
    DataUpdate,
}

/// A go-back that must only be committed if this proposal wins and the
/// transition actually happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingGoBack {
    pub from: StateName,
    pub to: StateName,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_go_back: Option<PendingGoBack>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, String>,
}

/// Action name carried by data-update proposals.
pub const COLLECT_DATA_ACTION: &str = "collect_data";

/// A candidate action, transition or data update for the current turn.
///
/// Created fresh each turn, discarded after resolution, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub kind: ProposalKind,
    pub action: String,
    pub next_state: Option<StateName>,
    pub data_updates: DataMap,
    pub priority: Priority,
    /// Combinable proposals may merge with winners of other kinds;
    /// blocking ones suppress them.
    pub combinable: bool,
    pub source: String,
    /// Registration index of the contributing source.
    pub source_order: usize,
    /// Position within the contributing source's output.
    pub sequence: usize,
    pub reason_codes: Vec<String>,
    pub metadata: ProposalMetadata,
}

impl Proposal {
    fn base(kind: ProposalKind, action: impl Into<String>, priority: Priority) -> Self {
        Self {
            kind,
            action: action.into(),
            next_state: None,
            data_updates: DataMap::new(),
            priority,
            combinable: true,
            source: String::new(),
            source_order: 0,
            sequence: 0,
            reason_codes: Vec::new(),
            metadata: ProposalMetadata::default(),
        }
    }

    /// Proposes an action without changing state.
    pub fn action(action: impl Into<String>, priority: Priority) -> Self {
        Self::base(ProposalKind::Action, action, priority)
    }

    /// Proposes moving to `target`, performing `action` on the way.
    pub fn transition(action: impl Into<String>, target: StateName, priority: Priority) -> Self {
        let mut proposal = Self::base(ProposalKind::Transition, action, priority);
        proposal.next_state = Some(target);
        proposal
    }

    /// Proposes merging fields into collected data.
    pub fn data_update(updates: DataMap, priority: Priority) -> Self {
        let mut proposal = Self::base(ProposalKind::DataUpdate, COLLECT_DATA_ACTION, priority);
        proposal.data_updates = updates;
        proposal
    }

    /// Marks the proposal as blocking.
    pub fn blocking(mut self) -> Self {
        self.combinable = false;
        self
    }

    pub fn with_reason(mut self, code: impl Into<String>) -> Self {
        self.reason_codes.push(code.into());
        self
    }

    pub fn with_pending_go_back(mut self, from: StateName, to: StateName) -> Self {
        self.metadata.pending_go_back = Some(PendingGoBack { from, to });
        self
    }

    pub fn with_note(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.notes.insert(key.into(), value.into());
        self
    }

    /// Attributes the proposal to a source. Done by the source registry.
    pub fn stamped(mut self, source: impl Into<String>, source_order: usize, sequence: usize) -> Self {
        self.source = source.into();
        self.source_order = source_order;
        self.sequence = sequence;
        self
    }

    pub fn has_reason(&self, code: &str) -> bool {
        self.reason_codes.iter().any(|c| c == code)
    }
}
