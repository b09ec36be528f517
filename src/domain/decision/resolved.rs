//! The resolved decision handed back to the orchestrator.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::DataMap;
use crate::domain::flow::NextState;

use super::proposal::PendingGoBack;
use super::trace::ResolutionTrace;

/// The single outcome of resolving a turn's proposals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDecision {
    pub action: String,
    pub next_state: NextState,
    pub data_updates: DataMap,
    pub trace: ResolutionTrace,
    /// Side effect to commit only if the decision is applied as resolved.
    pub deferred_go_back: Option<PendingGoBack>,
}

impl ResolvedDecision {
    pub fn is_stay(&self) -> bool {
        self.next_state.is_stay()
    }
}
