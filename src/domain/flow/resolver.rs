//! Resolves rule values against an evaluation context.

use crate::domain::conditions::{ConditionError, ConditionExpr, ConditionRegistry, EvaluationContext};

use super::rule::{NextState, RuleEntry, RuleValue};

/// Which part of a rule produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMatch {
    Literal,
    /// The condition at this position (0 for a single conditional rule).
    Condition { index: usize },
    /// No condition held; the list's trailing default applied.
    ListDefault,
    /// A single conditional rule whose condition did not hold.
    Unmatched,
}

/// Outcome of resolving one rule value.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'v> {
    pub value: Option<&'v str>,
    pub matched: RuleMatch,
    /// Conditions that failed to evaluate and were treated as false.
    pub failures: Vec<ConditionError>,
}

impl<'v> Resolution<'v> {
    /// The resolved action, if the rule produced one.
    pub fn action(&self) -> Option<&'v str> {
        self.value
    }

    /// The resolved transition, if the rule produced one.
    pub fn next_state(&self) -> Option<NextState> {
        self.value.map(NextState::from_rule_result)
    }
}

/// Evaluates the declarative rule grammar: the first true condition wins
/// and nothing after it is evaluated.
#[derive(Debug, Clone, Copy)]
pub struct RuleResolver<'r> {
    conditions: &'r ConditionRegistry,
}

impl<'r> RuleResolver<'r> {
    pub fn new(conditions: &'r ConditionRegistry) -> Self {
        Self { conditions }
    }

    pub fn resolve<'v>(&self, rule: &'v RuleValue, ctx: &EvaluationContext<'_>) -> Resolution<'v> {
        let mut failures = Vec::new();

        let (value, matched) = match rule {
            RuleValue::Literal(value) => (Some(value.as_str()), RuleMatch::Literal),
            RuleValue::Conditional(rule) => {
                if self.check(&rule.when, ctx, &mut failures) {
                    (Some(rule.then.as_str()), RuleMatch::Condition { index: 0 })
                } else {
                    (None, RuleMatch::Unmatched)
                }
            }
            RuleValue::Chain(entries) => self.resolve_chain(entries, ctx, &mut failures),
        };

        Resolution {
            value,
            matched,
            failures,
        }
    }

    fn resolve_chain<'v>(
        &self,
        entries: &'v [RuleEntry],
        ctx: &EvaluationContext<'_>,
        failures: &mut Vec<ConditionError>,
    ) -> (Option<&'v str>, RuleMatch) {
        for (index, entry) in entries.iter().enumerate() {
            match entry {
                RuleEntry::Conditional(rule) => {
                    if self.check(&rule.when, ctx, failures) {
                        return (Some(rule.then.as_str()), RuleMatch::Condition { index });
                    }
                }
                RuleEntry::Default(value) => return (Some(value.as_str()), RuleMatch::ListDefault),
            }
        }
        (None, RuleMatch::Unmatched)
    }

    fn check(
        &self,
        expr: &ConditionExpr,
        ctx: &EvaluationContext<'_>,
        failures: &mut Vec<ConditionError>,
    ) -> bool {
        match expr.evaluate(self.conditions, ctx) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(
                    conversation_id = %ctx.conversation_id,
                    state = %ctx.state,
                    condition = %expr,
                    error = %e,
                    "condition evaluation failed, treating as false"
                );
                failures.push(e);
                false
            }
        }
    }
}
