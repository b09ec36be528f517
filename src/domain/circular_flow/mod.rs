//! Circular flow - bounded reverts to an earlier phase.

mod ledger;
mod manager;

#[cfg(test)]
mod proptests;

pub use ledger::{GoBackError, GoBackLedger, GoBackRecord, DEFAULT_GO_BACK_BUDGET};
pub use manager::CircularFlowManager;
