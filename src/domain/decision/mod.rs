//! Decision - proposals, conflict resolution and the resolved decision.

mod proposal;
mod resolved;
mod resolver;
mod trace;

#[cfg(test)]
mod proptests;

pub use proposal::{
    PendingGoBack, Priority, Proposal, ProposalKind, ProposalMetadata, COLLECT_DATA_ACTION,
};
pub use resolved::ResolvedDecision;
pub use resolver::{
    ConflictResolver, FALLBACK_ACTION, REASON_EMPTY_ACTION, REASON_EMPTY_DATA_UPDATE,
    REASON_FINAL_STATE_LOCKED, REASON_GO_BACK_OUTRANKED, REASON_NO_CANDIDATES, REASON_UNKNOWN_STATE,
};
pub use trace::{ProposalOutcome, ResolutionTrace, SourceFailure, TraceEntry};
