//! Loop detection.

use crate::domain::conditions::EvaluationContext;
use crate::domain::decision::{Priority, Proposal};

use super::source::{KnowledgeSource, SourceError};

pub const REPETITION_SOURCE: &str = "repetition_guard";
pub const BREAK_LOOP_ACTION: &str = "break_loop";
pub const REPHRASE_ACTION: &str = "rephrase_and_clarify";

/// Detects a conversation going in circles and proposes an escape.
///
/// Triggers when the same intent keeps arriving while the state does not
/// change, or when external analyzers flag the conversation as stuck or
/// oscillating. Escapes to the state's `escape_to` target when it has one,
/// otherwise asks to rephrase.
pub struct RepetitionGuard;

impl RepetitionGuard {
    fn trigger(ctx: &EvaluationContext<'_>) -> Option<&'static str> {
        let threshold = ctx.limits.repetition_threshold;
        if ctx.history.streak(ctx.intent) >= threshold && ctx.turns_in_state + 1 >= threshold {
            Some("repetition_detected")
        } else if ctx.signals.is_stuck {
            Some("stuck_signal")
        } else if ctx.signals.has_oscillation {
            Some("oscillation_signal")
        } else {
            None
        }
    }
}

impl KnowledgeSource for RepetitionGuard {
    fn id(&self) -> &str {
        REPETITION_SOURCE
    }

    fn contribute(&self, ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
        if ctx.is_final_state() {
            return Ok(Vec::new());
        }
        let Some(reason) = Self::trigger(ctx) else {
            return Ok(Vec::new());
        };

        let escape = ctx
            .flow
            .state(ctx.state)
            .and_then(|config| config.escape_to.as_ref())
            .filter(|target| *target != ctx.state);

        let proposal = match escape {
            Some(target) => Proposal::transition(BREAK_LOOP_ACTION, target.clone(), Priority::High),
            None => Proposal::action(REPHRASE_ACTION, Priority::High),
        };
        Ok(vec![proposal.with_reason(reason)])
    }
}
