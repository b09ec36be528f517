//! Intent categories and the static classification table.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Intent, ValidationError};

/// Coarse category of an intent.
///
/// Categories are what the guards reason about: three different objection
/// intents in a row are still three consecutive objections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Greeting,
    Informative,
    Question,
    PriceQuestion,
    Objection,
    Positive,
    Negative,
    Escalation,
    GoBack,
    Farewell,
    Other,
}

impl IntentCategory {
    /// Returns all categories in declaration order.
    pub fn all() -> &'static [IntentCategory] {
        &[
            IntentCategory::Greeting,
            IntentCategory::Informative,
            IntentCategory::Question,
            IntentCategory::PriceQuestion,
            IntentCategory::Objection,
            IntentCategory::Positive,
            IntentCategory::Negative,
            IntentCategory::Escalation,
            IntentCategory::GoBack,
            IntentCategory::Farewell,
            IntentCategory::Other,
        ]
    }

    /// Returns the snake_case name used in flow documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::Greeting => "greeting",
            IntentCategory::Informative => "informative",
            IntentCategory::Question => "question",
            IntentCategory::PriceQuestion => "price_question",
            IntentCategory::Objection => "objection",
            IntentCategory::Positive => "positive",
            IntentCategory::Negative => "negative",
            IntentCategory::Escalation => "escalation",
            IntentCategory::GoBack => "go_back",
            IntentCategory::Farewell => "farewell",
            IntentCategory::Other => "other",
        }
    }

    /// Resolves the category of an intent.
    ///
    /// Exact table entries win; otherwise prefix rules apply, so any
    /// `objection_*` intent counts as an objection.
    pub fn of(intent: &Intent) -> IntentCategory {
        let name = intent.as_str();
        if let Some(category) = CATEGORY_TABLE.get(name) {
            return *category;
        }
        PREFIX_RULES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, category)| *category)
            .unwrap_or(IntentCategory::Other)
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentCategory::all()
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| {
                ValidationError::invalid_format("intent_category", format!("unknown category '{s}'"))
            })
    }
}

static CATEGORY_TABLE: Lazy<HashMap<&'static str, IntentCategory>> = Lazy::new(|| {
    use IntentCategory::*;
    HashMap::from([
        ("greeting", Greeting),
        ("small_talk", Greeting),
        ("provide_info", Informative),
        ("situation_provided", Informative),
        ("problem_revealed", Informative),
        ("implication_acknowledged", Informative),
        ("need_expressed", Informative),
        ("contact_provided", Informative),
        ("price_question", PriceQuestion),
        ("pricing_details", PriceQuestion),
        ("discount_request", PriceQuestion),
        ("question_features", Question),
        ("question_integrations", Question),
        ("question_security", Question),
        ("question_general", Question),
        ("agreement", Positive),
        ("interested", Positive),
        ("positive_feedback", Positive),
        ("ready_to_buy", Positive),
        ("demo_request", Positive),
        ("rejection", Negative),
        ("not_interested", Negative),
        ("request_human", Escalation),
        ("complaint", Escalation),
        ("request_manager", Escalation),
        ("go_back", GoBack),
        ("request_go_back", GoBack),
        ("correct_info", GoBack),
        ("farewell", Farewell),
        ("goodbye", Farewell),
    ])
});

static PREFIX_RULES: &[(&str, IntentCategory)] = &[
    ("objection", IntentCategory::Objection),
    ("question_", IntentCategory::Question),
    ("price", IntentCategory::PriceQuestion),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_entries_resolve() {
        assert_eq!(
            IntentCategory::of(&Intent::from("price_question")),
            IntentCategory::PriceQuestion
        );
        assert_eq!(
            IntentCategory::of(&Intent::from("request_human")),
            IntentCategory::Escalation
        );
        assert_eq!(IntentCategory::of(&Intent::from("go_back")), IntentCategory::GoBack);
    }

    #[test]
    fn objection_prefix_matches_any_objection() {
        for name in ["objection_price", "objection_timing", "objection_competitor", "objection"] {
            assert_eq!(
                IntentCategory::of(&Intent::from(name)),
                IntentCategory::Objection,
                "{name} should be an objection"
            );
        }
    }

    #[test]
    fn unknown_intents_are_other() {
        assert_eq!(IntentCategory::of(&Intent::from("weather_chat")), IntentCategory::Other);
    }

    #[test]
    fn parses_from_snake_case() {
        assert_eq!(
            "price_question".parse::<IntentCategory>().unwrap(),
            IntentCategory::PriceQuestion
        );
        assert!("nonsense".parse::<IntentCategory>().is_err());
    }

    #[test]
    fn as_str_round_trips_through_from_str() {
        for category in IntentCategory::all() {
            assert_eq!(category.as_str().parse::<IntentCategory>().unwrap(), *category);
        }
    }
}
