//! Go-back ledger: how many reverts a conversation has spent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::StateName;

/// Default number of go-backs a conversation may spend.
pub const DEFAULT_GO_BACK_BUDGET: u32 = 2;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GoBackError {
    #[error("go-back budget exhausted ({used}/{budget})")]
    BudgetExhausted { used: u32, budget: u32 },

    #[error("no go-back target from state '{0}'")]
    NoTarget(StateName),
}

/// One committed go-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoBackRecord {
    pub from: StateName,
    pub to: StateName,
    pub turn: u32,
}

/// Bounded, auditable go-back budget.
///
/// `used` never exceeds `budget`; it only grows through [`GoBackLedger::commit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoBackLedger {
    used: u32,
    budget: u32,
    history: Vec<GoBackRecord>,
}

impl GoBackLedger {
    pub fn new(budget: u32) -> Self {
        Self {
            used: 0,
            budget,
            history: Vec::new(),
        }
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn remaining(&self) -> u32 {
        self.budget.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.budget
    }

    pub fn history(&self) -> &[GoBackRecord] {
        &self.history
    }

    pub(crate) fn commit(&mut self, record: GoBackRecord) -> Result<(), GoBackError> {
        if self.is_exhausted() {
            return Err(GoBackError::BudgetExhausted {
                used: self.used,
                budget: self.budget,
            });
        }
        self.used += 1;
        self.history.push(record);
        Ok(())
    }

    /// True if the persisted counters are consistent with each other.
    pub fn is_consistent(&self) -> bool {
        self.used <= self.budget && self.history.len() == self.used as usize
    }
}

impl Default for GoBackLedger {
    fn default() -> Self {
        Self::new(DEFAULT_GO_BACK_BUDGET)
    }
}
