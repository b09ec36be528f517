//! Resolution trace: what each proposal contributed to a decision.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::StateName;

use super::proposal::{Priority, Proposal, ProposalKind};

/// How a proposal fared during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalOutcome {
    /// Supplied the decision's primary action or transition.
    Won,
    /// Merged into the decision alongside the winner.
    Merged,
    /// Outranked within its group.
    Lost,
    /// Suppressed by a blocking winner of another kind.
    Suppressed,
    /// Failed validation and never competed.
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub source: String,
    pub kind: ProposalKind,
    pub action: String,
    pub next_state: Option<StateName>,
    pub priority: Priority,
    pub combinable: bool,
    pub outcome: ProposalOutcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_codes: Vec<String>,
    /// Why the proposal was dropped, for invalid ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TraceEntry {
    pub(crate) fn from_proposal(proposal: &Proposal, outcome: ProposalOutcome) -> Self {
        Self {
            source: proposal.source.clone(),
            kind: proposal.kind,
            action: proposal.action.clone(),
            next_state: proposal.next_state.clone(),
            priority: proposal.priority,
            combinable: proposal.combinable,
            outcome,
            reason_codes: proposal.reason_codes.clone(),
            note: None,
        }
    }
}

/// A knowledge source that failed this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub message: String,
}

/// Audit record of one resolution. Never needed for correctness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTrace {
    pub entries: Vec<TraceEntry>,
    /// Reason codes of every proposal that won or merged, plus codes the
    /// resolver or orchestrator added.
    pub reasons: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_failures: Vec<SourceFailure>,
}

impl ResolutionTrace {
    pub fn has_reason(&self, code: &str) -> bool {
        self.reasons.contains(code)
    }

    pub fn add_reason(&mut self, code: impl Into<String>) {
        self.reasons.insert(code.into());
    }

    /// Entries that won or merged.
    pub fn winners(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, ProposalOutcome::Won | ProposalOutcome::Merged))
    }

    pub fn entries_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a TraceEntry> + 'a {
        self.entries.iter().filter(move |e| e.source == source)
    }

    pub(crate) fn record(&mut self, proposal: &Proposal, outcome: ProposalOutcome) {
        if matches!(outcome, ProposalOutcome::Won | ProposalOutcome::Merged) {
            self.reasons.extend(proposal.reason_codes.iter().cloned());
        }
        self.entries.push(TraceEntry::from_proposal(proposal, outcome));
    }

    pub(crate) fn record_invalid(&mut self, proposal: &Proposal, why: &str) {
        let mut entry = TraceEntry::from_proposal(proposal, ProposalOutcome::Invalid);
        entry.note = Some(why.to_string());
        self.entries.push(entry);
    }
}
