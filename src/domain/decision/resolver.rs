//! Conflict resolution.
//!
//! Proposals are validated, grouped by kind, and ordered by priority
//! (descending), then source registration order, then position within the
//! source. The ordering never depends on the order proposals arrive in, so
//! the same proposal set always yields the same decision.

use std::cmp::Reverse;

use crate::domain::conversation::DataMap;
use crate::domain::flow::{FlowConfig, NextState};
use crate::domain::foundation::StateName;

use super::proposal::{Priority, Proposal, ProposalKind};
use super::resolved::ResolvedDecision;
use super::trace::{ProposalOutcome, ResolutionTrace};

/// Action chosen when no action or transition proposal survives validation.
pub const FALLBACK_ACTION: &str = "continue_current_goal";

pub const REASON_NO_CANDIDATES: &str = "no_candidates";
pub const REASON_FINAL_STATE_LOCKED: &str = "final_state_locked";
pub const REASON_UNKNOWN_STATE: &str = "unknown_state";
pub const REASON_EMPTY_ACTION: &str = "empty_action";
pub const REASON_EMPTY_DATA_UPDATE: &str = "empty_data_update";
pub const REASON_GO_BACK_OUTRANKED: &str = "go_back_outranked";

#[derive(Debug, Clone)]
pub struct ConflictResolver {
    fallback_action: String,
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new(FALLBACK_ACTION)
    }
}

impl ConflictResolver {
    pub fn new(fallback_action: impl Into<String>) -> Self {
        Self {
            fallback_action: fallback_action.into(),
        }
    }

    pub fn resolve(
        &self,
        mut proposals: Vec<Proposal>,
        flow: &FlowConfig,
        current_state: &StateName,
    ) -> ResolvedDecision {
        proposals.sort_by_key(ordering_key);
        let mut trace = ResolutionTrace::default();

        let mut actions = Vec::new();
        let mut transitions = Vec::new();
        let mut data = Vec::new();
        for proposal in proposals {
            if let Err(why) = validate(&proposal, flow, current_state) {
                tracing::warn!(
                    source = %proposal.source,
                    action = %proposal.action,
                    reason = why,
                    "dropping invalid proposal"
                );
                trace.record_invalid(&proposal, why);
                trace.add_reason(why);
                continue;
            }
            match proposal.kind {
                ProposalKind::Action => actions.push(proposal),
                ProposalKind::Transition => transitions.push(proposal),
                ProposalKind::DataUpdate => data.push(proposal),
            }
        }

        let primary_is_transition = match (actions.first(), transitions.first()) {
            (Some(action), Some(transition)) => primary_key(transition) < primary_key(action),
            (None, Some(_)) => true,
            _ => false,
        };

        let (primary, secondary) = if primary_is_transition {
            (transitions.first(), actions.first())
        } else {
            (actions.first(), transitions.first())
        };

        let Some(primary) = primary else {
            tracing::warn!(state = %current_state, "no action or transition candidates, using fallback");
            trace.add_reason(REASON_NO_CANDIDATES);
            let data_updates = merge_data(&data, &mut trace);
            return ResolvedDecision {
                action: self.fallback_action.clone(),
                next_state: NextState::Stay,
                data_updates,
                trace,
                deferred_go_back: None,
            };
        };

        // A go-back only ever moves the conversation as the winning proposal.
        let secondary_is_go_back = secondary
            .map(|s| s.metadata.pending_go_back.is_some())
            .unwrap_or(false);
        if !primary_is_transition && secondary_is_go_back {
            trace.add_reason(REASON_GO_BACK_OUTRANKED);
        }

        let merges_secondary = !primary_is_transition
            && primary.combinable
            && !secondary_is_go_back
            && secondary.map(|s| s.combinable).unwrap_or(false);

        let (next_state, deferred_go_back) = if primary_is_transition {
            (goto(primary), primary.metadata.pending_go_back.clone())
        } else if merges_secondary {
            (secondary.map(goto).unwrap_or(NextState::Stay), None)
        } else {
            (NextState::Stay, None)
        };

        for (group_kind, group) in [
            (ProposalKind::Action, &actions),
            (ProposalKind::Transition, &transitions),
        ] {
            for (index, proposal) in group.iter().enumerate() {
                let outcome = if index == 0 && group_kind == primary.kind {
                    ProposalOutcome::Won
                } else if index == 0 && merges_secondary {
                    ProposalOutcome::Merged
                } else if !primary.combinable && group_kind != primary.kind {
                    ProposalOutcome::Suppressed
                } else {
                    ProposalOutcome::Lost
                };
                trace.record(proposal, outcome);
            }
        }

        let data_updates = merge_data(&data, &mut trace);

        let decision = ResolvedDecision {
            action: primary.action.clone(),
            next_state,
            data_updates,
            trace,
            deferred_go_back,
        };
        tracing::debug!(
            state = %current_state,
            action = %decision.action,
            next_state = ?decision.next_state,
            winner = %primary.source,
            "proposals resolved"
        );
        decision
    }
}

/// Group ordering: priority descending, then registration order, then
/// position within the source.
fn ordering_key(proposal: &Proposal) -> (Reverse<Priority>, usize, usize, ProposalKind) {
    (
        Reverse(proposal.priority),
        proposal.source_order,
        proposal.sequence,
        proposal.kind,
    )
}

/// Cross-group ordering between the best action and best transition. At
/// equal priority and source, the transition carries the decision.
fn primary_key(proposal: &Proposal) -> (Reverse<Priority>, usize, u8, usize) {
    let kind_rank = match proposal.kind {
        ProposalKind::Transition => 0,
        ProposalKind::Action => 1,
        ProposalKind::DataUpdate => 2,
    };
    (
        Reverse(proposal.priority),
        proposal.source_order,
        kind_rank,
        proposal.sequence,
    )
}

fn goto(proposal: &Proposal) -> NextState {
    proposal
        .next_state
        .clone()
        .map(NextState::Goto)
        .unwrap_or(NextState::Stay)
}

fn validate(
    proposal: &Proposal,
    flow: &FlowConfig,
    current_state: &StateName,
) -> Result<(), &'static str> {
    match proposal.kind {
        ProposalKind::Action | ProposalKind::Transition if proposal.action.trim().is_empty() => {
            Err(REASON_EMPTY_ACTION)
        }
        ProposalKind::Transition => match &proposal.next_state {
            Some(target) if !flow.has_state(target) => Err(REASON_UNKNOWN_STATE),
            None => Err(REASON_UNKNOWN_STATE),
            Some(_) if flow.is_final(current_state) => Err(REASON_FINAL_STATE_LOCKED),
            Some(_) => Ok(()),
        },
        ProposalKind::DataUpdate if proposal.data_updates.is_empty() => Err(REASON_EMPTY_DATA_UPDATE),
        _ => Ok(()),
    }
}

/// Merges data updates in resolution order; the first writer of a key wins.
/// A non-combinable top proposal applies alone.
fn merge_data(data: &[Proposal], trace: &mut ResolutionTrace) -> DataMap {
    let mut merged = DataMap::new();
    let exclusive = data.first().map(|p| !p.combinable).unwrap_or(false);

    for (index, proposal) in data.iter().enumerate() {
        let applies = index == 0 || (!exclusive && proposal.combinable);
        if applies {
            for (key, value) in &proposal.data_updates {
                merged.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        let outcome = match (applies, index) {
            (true, 0) => ProposalOutcome::Won,
            (true, _) => ProposalOutcome::Merged,
            (false, _) => ProposalOutcome::Lost,
        };
        trace.record(proposal, outcome);
    }
    merged
}
