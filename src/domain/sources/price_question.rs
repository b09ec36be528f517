//! Price and fact questions.

use std::sync::Arc;

use crate::domain::conditions::{ConditionRegistry, EvaluationContext};
use crate::domain::decision::{Priority, Proposal};
use crate::domain::intent::IntentCategory;

use super::source::{KnowledgeSource, SourceError};

pub const PRICE_QUESTION_SOURCE: &str = "price_question";
pub const DIRECT_ANSWER_ACTION: &str = "direct_answer";
pub const DEFLECT_ACTION: &str = "deflect_and_probe";
pub const ANSWER_QUESTION_ACTION: &str = "answer_question";

/// Condition deciding whether a price can be quoted.
const PRICE_CONDITION: &str = "price_data_known";

/// Answers price questions directly once the data a quote depends on is
/// known, and otherwise deflects while probing for it. Other questions get
/// a plain answer proposal.
pub struct PriceQuestionHandler {
    conditions: Arc<ConditionRegistry>,
}

impl PriceQuestionHandler {
    pub fn new(conditions: Arc<ConditionRegistry>) -> Self {
        Self { conditions }
    }
}

impl KnowledgeSource for PriceQuestionHandler {
    fn id(&self) -> &str {
        PRICE_QUESTION_SOURCE
    }

    fn contribute(&self, ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
        match ctx.category {
            IntentCategory::PriceQuestion => {
                let (known, error) = match self.conditions.evaluate(PRICE_CONDITION, ctx) {
                    Ok(known) => (known, None),
                    Err(e) => {
                        tracing::error!(
                            conversation_id = %ctx.conversation_id,
                            error = %e,
                            "price condition failed, deflecting"
                        );
                        (false, Some(format!("condition_error:{PRICE_CONDITION}")))
                    }
                };

                let mut proposal = if known {
                    Proposal::action(DIRECT_ANSWER_ACTION, Priority::High).with_reason("price_data_known")
                } else {
                    Proposal::action(DEFLECT_ACTION, Priority::High).with_reason("price_data_missing")
                };
                if let Some(code) = error {
                    proposal = proposal.with_reason(code);
                }
                Ok(vec![proposal])
            }
            IntentCategory::Question => Ok(vec![
                Proposal::action(ANSWER_QUESTION_ACTION, Priority::Normal).with_reason("fact_question"),
            ]),
            _ => Ok(Vec::new()),
        }
    }
}
