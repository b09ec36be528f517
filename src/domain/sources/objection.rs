//! Objection handling: the limit guard and recovery after an objection.

use crate::domain::conditions::EvaluationContext;
use crate::domain::decision::{Priority, Proposal};
use crate::domain::intent::IntentCategory;

use super::source::{KnowledgeSource, SourceError};

pub const OBJECTION_LIMIT_SOURCE: &str = "objection_limit_guard";
pub const OBJECTION_RECOVERY_SOURCE: &str = "objection_recovery";
pub const OBJECTION_LIMIT_ACTION: &str = "objection_limit_reached";
pub const RESUME_ACTION: &str = "resume_after_objection";

/// Stops the conversation from circling objections forever.
///
/// Fires on an objection turn once the consecutive or lifetime objection
/// count reaches its limit, and outranks every ordinary proposal.
pub struct ObjectionLimitGuard;

impl KnowledgeSource for ObjectionLimitGuard {
    fn id(&self) -> &str {
        OBJECTION_LIMIT_SOURCE
    }

    fn contribute(&self, ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
        if ctx.category != IntentCategory::Objection || !ctx.objection_limit_reached() {
            return Ok(Vec::new());
        }

        tracing::info!(
            conversation_id = %ctx.conversation_id,
            consecutive = ctx.consecutive_objections(),
            total = ctx.total_objections(),
            "objection limit reached"
        );

        let proposal = match &ctx.flow.objection_limit_target {
            Some(target) if target != ctx.state && !ctx.is_final_state() => {
                Proposal::transition(OBJECTION_LIMIT_ACTION, target.clone(), Priority::Critical)
            }
            _ => Proposal::action(OBJECTION_LIMIT_ACTION, Priority::Critical),
        };
        Ok(vec![proposal.blocking().with_reason(OBJECTION_LIMIT_ACTION)])
    }
}

/// Returns to the interrupted state once the user turns positive while an
/// objection is being handled.
pub struct ObjectionRecoverySource;

impl KnowledgeSource for ObjectionRecoverySource {
    fn id(&self) -> &str {
        OBJECTION_RECOVERY_SOURCE
    }

    fn contribute(&self, ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
        if !ctx.in_objection_handling() || ctx.category != IntentCategory::Positive {
            return Ok(Vec::new());
        }
        match ctx.state_before_objection {
            Some(previous) if previous != ctx.state && ctx.flow.has_state(previous) => Ok(vec![
                Proposal::transition(RESUME_ACTION, previous.clone(), Priority::High)
                    .with_reason("objection_resolved"),
            ]),
            _ => Ok(Vec::new()),
        }
    }
}
