//! Built-in condition catalogue.
//!
//! Conditions fall into four groups: data presence, external signals,
//! conversation history, and flow position.

use super::signals::{Engagement, Momentum};
use super::{ConditionRegistry, EvaluationContext};

/// Frustration level from which `frustration_high` holds.
pub const FRUSTRATION_HIGH: u8 = 7;

type Flag = fn(&EvaluationContext<'_>) -> bool;

static CATALOGUE: &[(&str, Flag)] = &[
    // data
    ("has_company_size", |ctx| ctx.has_data("company_size")),
    ("has_industry", |ctx| ctx.has_data("industry")),
    ("has_pain_point", |ctx| ctx.has_data("pain_point")),
    ("has_budget", |ctx| ctx.has_data("budget")),
    ("has_timeline", |ctx| ctx.has_data("timeline")),
    ("has_contact_info", |ctx| {
        ctx.has_data("contact_email") || ctx.has_data("contact_phone")
    }),
    ("price_data_known", |ctx| {
        ctx.has_data("company_size") || ctx.has_data("users_count")
    }),
    ("required_data_complete", |ctx| ctx.required_data_complete()),
    ("has_extracted_data", |ctx| {
        ctx.extracted_data.values().any(|v| !v.is_null())
    }),
    // signals
    ("frustration_high", |ctx| ctx.signals.frustration_level >= FRUSTRATION_HIGH),
    ("is_stuck", |ctx| ctx.signals.is_stuck),
    ("has_oscillation", |ctx| ctx.signals.has_oscillation),
    ("momentum_positive", |ctx| ctx.signals.momentum == Momentum::Positive),
    ("momentum_negative", |ctx| ctx.signals.momentum == Momentum::Negative),
    ("engagement_low", |ctx| ctx.signals.engagement == Engagement::Low),
    // history
    ("is_first_turn", |ctx| ctx.turn <= 1),
    ("intent_repeated", |ctx| ctx.history.streak(ctx.intent) >= 2),
    ("objection_repeated", |ctx| ctx.consecutive_objections() >= 2),
    ("objection_limit_reached", |ctx| ctx.objection_limit_reached()),
    ("lingering_in_state", |ctx| {
        ctx.turns_in_state >= ctx.limits.repetition_threshold
    }),
    // flow position
    ("can_go_back", |ctx| ctx.circular_flow.can_go_back(ctx.state)),
    ("has_state_before_objection", |ctx| ctx.state_before_objection.is_some()),
    ("in_objection_handling", |ctx| ctx.in_objection_handling()),
    ("is_final_state", |ctx| ctx.is_final_state()),
];

/// Registers every built-in condition. Names in the catalogue are unique
/// and well-formed, so registration into an empty registry cannot fail;
/// names already present are left untouched.
pub(crate) fn register_all(registry: &mut ConditionRegistry) {
    for (name, flag) in CATALOGUE {
        let flag = *flag;
        if let Err(e) = registry.register_flag(*name, flag) {
            tracing::warn!(condition = %name, error = %e, "skipping built-in condition");
        }
    }
}

/// Names of every built-in condition.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    CATALOGUE.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::super::testing::ContextFixture;
    use super::super::ExternalSignals;
    use super::*;
    use serde_json::json;

    fn eval(fixture: &ContextFixture, name: &str) -> bool {
        ConditionRegistry::with_builtins()
            .evaluate(name, &fixture.context())
            .unwrap()
    }

    mod data {
        use super::*;

        #[test]
        fn price_data_known_needs_company_size_or_users() {
            let empty = ContextFixture::new("situation", "price_question");
            assert!(!eval(&empty, "price_data_known"));

            let sized = ContextFixture::new("situation", "price_question")
                .with_data("company_size", json!(50));
            assert!(eval(&sized, "price_data_known"));

            let users = ContextFixture::new("situation", "price_question")
                .with_extracted("users_count", json!(12));
            assert!(eval(&users, "price_data_known"));
        }

        #[test]
        fn contact_info_accepts_email_or_phone() {
            let phone = ContextFixture::new("close", "contact_provided")
                .with_extracted("contact_phone", json!("+1 555 0100"));
            assert!(eval(&phone, "has_contact_info"));
        }
    }

    mod signals {
        use super::*;

        #[test]
        fn frustration_threshold() {
            let calm = ContextFixture::new("situation", "provide_info").with_signals(ExternalSignals {
                frustration_level: FRUSTRATION_HIGH - 1,
                ..Default::default()
            });
            assert!(!eval(&calm, "frustration_high"));

            let angry = ContextFixture::new("situation", "provide_info").with_signals(ExternalSignals {
                frustration_level: FRUSTRATION_HIGH,
                ..Default::default()
            });
            assert!(eval(&angry, "frustration_high"));
        }

        #[test]
        fn momentum_flags() {
            let fixture = ContextFixture::new("situation", "provide_info").with_signals(ExternalSignals {
                momentum: Momentum::Negative,
                ..Default::default()
            });
            assert!(eval(&fixture, "momentum_negative"));
            assert!(!eval(&fixture, "momentum_positive"));
        }
    }

    mod history {
        use super::*;

        #[test]
        fn intent_repeated_counts_current_turn() {
            let fixture =
                ContextFixture::new("situation", "question_features").preceded_by(&["question_features"]);
            assert!(eval(&fixture, "intent_repeated"));
        }

        #[test]
        fn first_turn() {
            let fixture = ContextFixture::new("greeting", "greeting");
            assert!(eval(&fixture, "is_first_turn"));

            let later = ContextFixture::new("situation", "provide_info").preceded_by(&["greeting"]);
            assert!(!eval(&later, "is_first_turn"));
        }
    }

    mod position {
        use super::*;

        #[test]
        fn can_go_back_follows_budget() {
            let fresh = ContextFixture::new("problem", "go_back");
            assert!(eval(&fresh, "can_go_back"));

            let exhausted = ContextFixture::new("problem", "go_back").with_go_backs_used(2);
            assert!(!eval(&exhausted, "can_go_back"));
        }

        #[test]
        fn greeting_has_no_go_back_target() {
            let fixture = ContextFixture::new("greeting", "go_back");
            assert!(!eval(&fixture, "can_go_back"));
        }
    }

    #[test]
    fn catalogue_names_are_unique() {
        let mut names: Vec<_> = builtin_names().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(ConditionRegistry::with_builtins().len(), total);
    }
}
