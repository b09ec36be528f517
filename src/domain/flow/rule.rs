//! Declarative rule grammar.
//!
//! A rule value is one of:
//!
//! ```yaml
//! # literal: unconditional
//! provide_info: acknowledge_and_probe
//!
//! # single (condition, result) pair: falls through to a default elsewhere
//! price_question:
//!   when: price_data_known
//!   then: direct_answer
//!
//! # prioritized list ending in a literal default ("none" = stay, transitions only)
//! provide_info:
//!   - when: has_pain_point
//!     then: implication
//!   - when: { all: [has_company_size, momentum_positive] }
//!     then: problem
//!   - none
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::conditions::ConditionExpr;
use crate::domain::foundation::StateName;

/// Transition keyword meaning "stay in the current state".
pub const STAY: &str = "none";

/// A `(condition, result)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRule {
    pub when: ConditionExpr,
    pub then: String,
}

/// One entry of a prioritized rule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
    Conditional(ConditionalRule),
    Default(String),
}

/// A rule value as written in a flow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Literal(String),
    Conditional(ConditionalRule),
    Chain(Vec<RuleEntry>),
}

impl RuleValue {
    /// Every condition name referenced anywhere in this rule.
    pub fn referenced_conditions(&self) -> Vec<&str> {
        match self {
            RuleValue::Literal(_) => Vec::new(),
            RuleValue::Conditional(rule) => rule.when.referenced_names(),
            RuleValue::Chain(entries) => entries
                .iter()
                .flat_map(|entry| match entry {
                    RuleEntry::Conditional(rule) => rule.when.referenced_names(),
                    RuleEntry::Default(_) => Vec::new(),
                })
                .collect(),
        }
    }

    /// Every result value this rule can produce, including defaults.
    pub fn possible_results(&self) -> Vec<&str> {
        match self {
            RuleValue::Literal(value) => vec![value.as_str()],
            RuleValue::Conditional(rule) => vec![rule.then.as_str()],
            RuleValue::Chain(entries) => entries
                .iter()
                .map(|entry| match entry {
                    RuleEntry::Conditional(rule) => rule.then.as_str(),
                    RuleEntry::Default(value) => value.as_str(),
                })
                .collect(),
        }
    }
}

/// Where a decision leaves the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextState {
    Stay,
    Goto(StateName),
}

impl NextState {
    /// Interprets a transition rule result: `"none"` means stay.
    pub fn from_rule_result(value: &str) -> Self {
        if value == STAY {
            NextState::Stay
        } else {
            NextState::Goto(StateName::from(value))
        }
    }

    pub fn target(&self) -> Option<&StateName> {
        match self {
            NextState::Stay => None,
            NextState::Goto(state) => Some(state),
        }
    }

    pub fn is_stay(&self) -> bool {
        matches!(self, NextState::Stay)
    }
}
