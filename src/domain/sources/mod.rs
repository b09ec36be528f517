//! Knowledge sources - independent, pluggable decision contributors.
//!
//! Each source looks at the per-turn context and proposes zero or more
//! actions, transitions or data updates. New decision logic is added by
//! registering another source; the resolver and orchestrator never change.

mod data_collector;
mod escalation;
mod fallback;
mod flow_rules;
mod go_back;
mod objection;
mod price_question;
mod registry;
mod repetition;
mod source;

use std::sync::Arc;

use crate::domain::conditions::ConditionRegistry;

pub use data_collector::{DataCollector, DATA_COLLECTOR_SOURCE};
pub use escalation::{EscalationGuard, ESCALATION_SOURCE, HANDOFF_ACTION};
pub use fallback::{FallbackSource, FALLBACK_SOURCE};
pub use flow_rules::{FlowRulesSource, FLOW_RULES_SOURCE};
pub use go_back::{GoBackGuard, GO_BACK_ACTION, GO_BACK_REFUSED_ACTION, GO_BACK_SOURCE};
pub use objection::{
    ObjectionLimitGuard, ObjectionRecoverySource, OBJECTION_LIMIT_ACTION, OBJECTION_LIMIT_SOURCE,
    OBJECTION_RECOVERY_SOURCE, RESUME_ACTION,
};
pub use price_question::{
    PriceQuestionHandler, ANSWER_QUESTION_ACTION, DEFLECT_ACTION, DIRECT_ANSWER_ACTION,
    PRICE_QUESTION_SOURCE,
};
pub use registry::{InvocationMode, SourceOutput, SourceRegistry, SourceRegistryError};
pub use repetition::{RepetitionGuard, BREAK_LOOP_ACTION, REPHRASE_ACTION, REPETITION_SOURCE};
pub use source::{KnowledgeSource, SourceError};

/// The canonical source set, in registration order.
///
/// Order matters for equal-priority ties: flow rules first, then the
/// critical guards (escalation before the objection limit), then the
/// situational handlers, then data collection and the fallback.
pub fn default_sources(conditions: Arc<ConditionRegistry>) -> Vec<Arc<dyn KnowledgeSource>> {
    vec![
        Arc::new(FlowRulesSource::new(conditions.clone())),
        Arc::new(EscalationGuard),
        Arc::new(ObjectionLimitGuard),
        Arc::new(GoBackGuard),
        Arc::new(RepetitionGuard),
        Arc::new(PriceQuestionHandler::new(conditions)),
        Arc::new(ObjectionRecoverySource),
        Arc::new(DataCollector),
        Arc::new(FallbackSource),
    ]
}

/// A registry holding [`default_sources`].
pub fn default_registry(
    conditions: Arc<ConditionRegistry>,
    mode: InvocationMode,
) -> Result<SourceRegistry, SourceRegistryError> {
    let mut registry = SourceRegistry::new(mode);
    for source in default_sources(conditions) {
        registry.register(source)?;
    }
    registry.ensure_fallback()?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_a_fallback_and_fixed_order() {
        let registry =
            default_registry(Arc::new(ConditionRegistry::with_builtins()), InvocationMode::Sequential)
                .unwrap();

        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids.first(), Some(&FLOW_RULES_SOURCE));
        assert_eq!(ids.last(), Some(&FALLBACK_SOURCE));
        let escalation = ids.iter().position(|id| *id == ESCALATION_SOURCE).unwrap();
        let objection = ids.iter().position(|id| *id == OBJECTION_LIMIT_SOURCE).unwrap();
        assert!(escalation < objection);
        assert_eq!(registry.ensure_fallback(), Ok(()));
    }
}
