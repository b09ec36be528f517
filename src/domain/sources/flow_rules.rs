//! Proposals derived from the flow's declarative rules and transitions.

use std::sync::Arc;

use crate::domain::conditions::{ConditionError, ConditionRegistry, EvaluationContext};
use crate::domain::decision::{Priority, Proposal, FALLBACK_ACTION};
use crate::domain::flow::{NextState, RuleResolver};

use super::source::{KnowledgeSource, SourceError};

pub const FLOW_RULES_SOURCE: &str = "flow_rules";

/// Resolves the current state's rule and transition for this turn's intent.
///
/// A single conditional rule that does not match falls back to the state or
/// flow default action; a transition that does not match means stay.
pub struct FlowRulesSource {
    conditions: Arc<ConditionRegistry>,
}

impl FlowRulesSource {
    pub fn new(conditions: Arc<ConditionRegistry>) -> Self {
        Self { conditions }
    }
}

impl KnowledgeSource for FlowRulesSource {
    fn id(&self) -> &str {
        FLOW_RULES_SOURCE
    }

    fn contribute(&self, ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
        let resolver = RuleResolver::new(&self.conditions);
        let mut proposals = Vec::new();
        let mut failures: Vec<ConditionError> = Vec::new();

        let mut action = None;
        let mut action_reason = None;
        if let Some((key, rule)) = ctx.flow.rule_for(ctx.state, ctx.intent) {
            let resolution = resolver.resolve(rule, ctx);
            failures.extend(resolution.failures.iter().cloned());
            action = resolution
                .action()
                .or_else(|| ctx.flow.default_action_for(ctx.state));
            action_reason = Some(format!("rule:{key}"));
        }

        let mut target = None;
        let mut transition_reason = None;
        if let Some((key, rule)) = ctx.flow.transition_for(ctx.state, ctx.intent) {
            let resolution = resolver.resolve(rule, ctx);
            failures.extend(resolution.failures.iter().cloned());
            if let Some(NextState::Goto(state)) = resolution.next_state() {
                if &state != ctx.state {
                    target = Some(state);
                    transition_reason = Some(format!("transition:{key}"));
                }
            }
        }

        let condition_reasons: Vec<String> = failures
            .iter()
            .map(|e| format!("condition_error:{}", e.condition_name()))
            .collect();

        if let (Some(action), Some(reason)) = (action, action_reason) {
            let mut proposal = Proposal::action(action, Priority::Normal).with_reason(reason);
            for code in &condition_reasons {
                proposal = proposal.with_reason(code.clone());
            }
            proposals.push(proposal);
        }

        if let (Some(target), Some(reason)) = (target, transition_reason) {
            let action = action
                .or_else(|| ctx.flow.default_action_for(ctx.state))
                .unwrap_or(FALLBACK_ACTION);
            let mut proposal =
                Proposal::transition(action, target, Priority::Normal).with_reason(reason);
            for code in condition_reasons {
                proposal = proposal.with_reason(code);
            }
            proposals.push(proposal);
        }

        Ok(proposals)
    }
}
