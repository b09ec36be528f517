//! Human handoff when escalation requests repeat or frustration peaks.

use crate::domain::conditions::EvaluationContext;
use crate::domain::decision::{Priority, Proposal};
use crate::domain::intent::IntentCategory;

use super::source::{KnowledgeSource, SourceError};

pub const ESCALATION_SOURCE: &str = "escalation_guard";
pub const HANDOFF_ACTION: &str = "handoff_to_human";

pub struct EscalationGuard;

impl EscalationGuard {
    fn trigger(ctx: &EvaluationContext<'_>) -> Option<&'static str> {
        if ctx.category == IntentCategory::Escalation
            && ctx.history.category_total(IntentCategory::Escalation) >= ctx.limits.escalation_threshold
        {
            Some("escalation_threshold_reached")
        } else if ctx.signals.frustration_level >= ctx.limits.frustration_handoff_level {
            Some("frustration_handoff")
        } else {
            None
        }
    }
}

impl KnowledgeSource for EscalationGuard {
    fn id(&self) -> &str {
        ESCALATION_SOURCE
    }

    fn contribute(&self, ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
        if ctx.is_final_state() {
            return Ok(Vec::new());
        }
        let Some(reason) = Self::trigger(ctx) else {
            return Ok(Vec::new());
        };

        tracing::info!(
            conversation_id = %ctx.conversation_id,
            state = %ctx.state,
            reason,
            "proposing human handoff"
        );

        let proposal = match &ctx.flow.escalation_target {
            Some(target) if target != ctx.state => {
                Proposal::transition(HANDOFF_ACTION, target.clone(), Priority::Critical)
            }
            _ => Proposal::action(HANDOFF_ACTION, Priority::Critical),
        };
        Ok(vec![proposal
            .blocking()
            .with_reason(reason)
            .with_reason("escalation")])
    }
}
