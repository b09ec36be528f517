//! Engine - the shared decision engine and the per-conversation orchestrator.

mod decision_engine;
mod limits;
mod orchestrator;
mod turn;

pub use decision_engine::{DecisionEngine, DecisionEngineBuilder, EngineError};
pub use limits::EngineLimits;
pub use orchestrator::{Orchestrator, REASON_GO_BACK_NOT_APPLIED, REASON_INVALID_TRANSITION};
pub use turn::{TurnInput, TurnOutcome};
