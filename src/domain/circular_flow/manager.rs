//! Circular flow manager.
//!
//! Decides whether a conversation may revert to an earlier phase, using a
//! two-step protocol: sources ask [`CircularFlowManager::can_go_back`]
//! while proposing, and the orchestrator calls
//! [`CircularFlowManager::record_go_back`] only once the go-back has
//! actually won and been applied.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::flow::FlowConfig;
use crate::domain::foundation::StateName;

use super::ledger::{GoBackError, GoBackLedger, GoBackRecord};

/// Fallback targets used when a flow declares no explicit mapping.
static DEFAULT_GO_BACK_TARGETS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("problem", "situation"),
        ("implication", "problem"),
        ("need_payoff", "implication"),
        ("presentation", "need_payoff"),
        ("soft_close", "presentation"),
        ("close", "soft_close"),
    ])
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircularFlowManager {
    ledger: GoBackLedger,
    explicit_targets: BTreeMap<StateName, StateName>,
}

impl CircularFlowManager {
    pub fn new(budget: u32, explicit_targets: BTreeMap<StateName, StateName>) -> Self {
        Self {
            ledger: GoBackLedger::new(budget),
            explicit_targets,
        }
    }

    /// A manager using the flow's explicit go-back map.
    pub fn for_flow(flow: &FlowConfig, budget: u32) -> Self {
        Self::new(budget, flow.go_back.clone())
    }

    /// Rebuilds a manager from a persisted ledger.
    pub fn from_ledger(ledger: GoBackLedger, flow: &FlowConfig) -> Self {
        Self {
            ledger,
            explicit_targets: flow.go_back.clone(),
        }
    }

    /// Where a go-back from `state` would lead: the explicit mapping, else
    /// the static default map.
    pub fn go_back_target(&self, state: &StateName) -> Option<StateName> {
        self.explicit_targets.get(state).cloned().or_else(|| {
            DEFAULT_GO_BACK_TARGETS
                .get(state.as_str())
                .map(|target| StateName::from(*target))
        })
    }

    /// True iff the budget is not exhausted and a target is resolvable.
    pub fn can_go_back(&self, state: &StateName) -> bool {
        !self.ledger.is_exhausted() && self.go_back_target(state).is_some()
    }

    /// Commits a go-back that has been applied.
    pub fn record_go_back(
        &mut self,
        from: &StateName,
        to: &StateName,
        turn: u32,
    ) -> Result<(), GoBackError> {
        self.ledger.commit(GoBackRecord {
            from: from.clone(),
            to: to.clone(),
            turn,
        })?;
        tracing::info!(
            from = %from,
            to = %to,
            used = self.ledger.used(),
            budget = self.ledger.budget(),
            "go-back committed"
        );
        Ok(())
    }

    pub fn ledger(&self) -> &GoBackLedger {
        &self.ledger
    }

    pub fn used(&self) -> u32 {
        self.ledger.used()
    }

    pub fn budget(&self) -> u32 {
        self.ledger.budget()
    }

    pub(crate) fn reset(&mut self) {
        self.ledger = GoBackLedger::new(self.ledger.budget());
    }
}
