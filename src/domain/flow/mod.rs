//! Flow - declarative states, rules and transitions.
//!
//! A flow is loaded once, validated against the condition registry by
//! [`FlowValidator`], and shared read-only for the life of the engine.

mod config;
mod resolver;
mod rule;
mod validation;

pub use config::{FlowConfig, StateConfig, CATEGORY_KEY_PREFIX, WILDCARD_KEY};
pub use resolver::{Resolution, RuleMatch, RuleResolver};
pub use rule::{ConditionalRule, NextState, RuleEntry, RuleValue, STAY};
pub use validation::{ConfigIssue, ConfigurationError, FlowValidator};
