//! Go-back requests.

use crate::domain::conditions::EvaluationContext;
use crate::domain::decision::{Priority, Proposal};
use crate::domain::intent::IntentCategory;

use super::source::{KnowledgeSource, SourceError};

pub const GO_BACK_SOURCE: &str = "go_back_guard";
pub const GO_BACK_ACTION: &str = "go_back";
pub const GO_BACK_REFUSED_ACTION: &str = "go_back_refused";

/// Proposes reverting one phase on a go-back intent.
///
/// Only checks the budget; the winning go-back is committed by the
/// orchestrator once it has actually been applied.
pub struct GoBackGuard;

impl KnowledgeSource for GoBackGuard {
    fn id(&self) -> &str {
        GO_BACK_SOURCE
    }

    fn contribute(&self, ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
        if ctx.category != IntentCategory::GoBack || ctx.is_final_state() {
            return Ok(Vec::new());
        }

        let target = ctx.circular_flow.go_back_target(ctx.state);
        let proposal = match target {
            Some(target) if ctx.circular_flow.can_go_back(ctx.state) && ctx.flow.has_state(&target) => {
                Proposal::transition(GO_BACK_ACTION, target.clone(), Priority::High)
                    .with_pending_go_back(ctx.state.clone(), target)
                    .with_reason("go_back_requested")
            }
            Some(_) if ctx.circular_flow.ledger().is_exhausted() => {
                Proposal::action(GO_BACK_REFUSED_ACTION, Priority::Normal)
                    .with_reason("go_back_budget_exhausted")
            }
            _ => Proposal::action(GO_BACK_REFUSED_ACTION, Priority::Normal)
                .with_reason("go_back_no_target"),
        };
        Ok(vec![proposal])
    }
}
