//! Lowest-priority default so every turn has at least one candidate.

use crate::domain::conditions::EvaluationContext;
use crate::domain::decision::{Priority, Proposal, FALLBACK_ACTION};

use super::source::{KnowledgeSource, SourceError};

pub const FALLBACK_SOURCE: &str = "fallback";

pub struct FallbackSource;

impl KnowledgeSource for FallbackSource {
    fn id(&self) -> &str {
        FALLBACK_SOURCE
    }

    fn contribute(&self, ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
        Ok(vec![Proposal::action(FALLBACK_ACTION, Priority::Low)
            .with_reason("fallback")
            .with_note("goal", ctx.flow.goal_for(ctx.state))])
    }

    fn is_fallback(&self) -> bool {
        true
    }
}
