//! Static validation of a flow against a condition registry.
//!
//! Runs once when the engine is built. Every problem found is collected so
//! a broken flow reports all of its issues at once.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::domain::conditions::{ConditionExpr, ConditionRegistry};
use crate::domain::foundation::StateName;
use crate::domain::intent::IntentCategory;

use super::config::{FlowConfig, StateConfig, CATEGORY_KEY_PREFIX, WILDCARD_KEY};
use super::rule::{RuleEntry, RuleValue, STAY};

/// One problem found in a flow document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    /// Dotted path to the offending element, e.g. `states.situation.transitions.provide_info[1]`.
    pub location: String,
    pub message: String,
}

impl ConfigIssue {
    fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("failed to parse flow: {0}")]
    Parse(String),

    #[error("flow configuration has {} issue(s): {}", .0.len(), summarize(.0))]
    Invalid(Vec<ConfigIssue>),
}

impl ConfigurationError {
    pub fn issues(&self) -> &[ConfigIssue] {
        match self {
            ConfigurationError::Parse(_) => &[],
            ConfigurationError::Invalid(issues) => issues,
        }
    }
}

fn summarize(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    Action,
    Transition,
}

/// Checks that every referenced condition exists, every transition target
/// is a known state, and every rule can always produce a result.
pub struct FlowValidator<'a> {
    flow: &'a FlowConfig,
    conditions: &'a ConditionRegistry,
    issues: Vec<ConfigIssue>,
}

impl<'a> FlowValidator<'a> {
    pub fn new(flow: &'a FlowConfig, conditions: &'a ConditionRegistry) -> Self {
        Self {
            flow,
            conditions,
            issues: Vec::new(),
        }
    }

    pub fn validate(mut self) -> Result<(), ConfigurationError> {
        let flow = self.flow;
        self.check_flow_header();
        for (name, state) in &flow.states {
            self.check_state(name, state);
        }
        self.check_go_back_map();

        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::Invalid(self.issues))
        }
    }

    fn push(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ConfigIssue::new(location, message));
    }

    fn check_flow_header(&mut self) {
        let flow = self.flow;
        if flow.name.trim().is_empty() {
            self.push("name", "flow name cannot be empty");
        }
        if flow.states.is_empty() {
            self.push("states", "flow declares no states");
        }
        if !flow.has_state(&flow.entry_state) {
            self.push(
                "entry_state",
                format!("unknown state '{}'", flow.entry_state),
            );
        }
        if let Some(action) = &flow.default_action {
            self.check_action_literal("default_action", action);
        }
        for (field, target) in [
            ("objection_limit_target", &flow.objection_limit_target),
            ("escalation_target", &flow.escalation_target),
        ] {
            if let Some(target) = target {
                self.check_known_state(field, target);
            }
        }
    }

    fn check_state(&mut self, name: &StateName, state: &StateConfig) {
        let base = format!("states.{name}");

        if name.is_blank() {
            self.push(&base, "state name cannot be empty");
        }
        if state.phase.as_ref().map(|p| p.is_blank()).unwrap_or(false) {
            self.push(format!("{base}.phase"), "phase cannot be empty");
        }
        for (i, field) in state.required_data.iter().enumerate() {
            if field.trim().is_empty() {
                self.push(format!("{base}.required_data[{i}]"), "field name cannot be empty");
            }
        }
        if let Some(action) = &state.default_action {
            self.check_action_literal(&format!("{base}.default_action"), action);
        }
        if let Some(target) = &state.escape_to {
            self.check_known_state(&format!("{base}.escape_to"), target);
        }
        if state.is_final && !state.transitions.is_empty() {
            self.push(
                format!("{base}.transitions"),
                "final state cannot declare transitions",
            );
        }

        let has_default = self.flow.default_action_for(name).is_some();
        for (key, rule) in &state.rules {
            let location = format!("{base}.rules.{key}");
            self.check_key(&location, key);
            self.check_rule(&location, rule, RuleKind::Action, has_default);
        }
        for (key, rule) in &state.transitions {
            let location = format!("{base}.transitions.{key}");
            self.check_key(&location, key);
            self.check_rule(&location, rule, RuleKind::Transition, true);
        }
    }

    fn check_go_back_map(&mut self) {
        let flow = self.flow;
        for (from, to) in &flow.go_back {
            let location = format!("go_back.{from}");
            self.check_known_state(&location, from);
            self.check_known_state(&location, to);
        }
    }

    fn check_key(&mut self, location: &str, key: &str) {
        if key.trim().is_empty() {
            self.push(location, "rule key cannot be empty");
        } else if let Some(category) = key.strip_prefix(CATEGORY_KEY_PREFIX) {
            if category.parse::<IntentCategory>().is_err() {
                self.push(location, format!("unknown intent category '{category}'"));
            }
        } else if key != WILDCARD_KEY && key.contains('*') {
            self.push(location, "wildcard key must be exactly '*'");
        }
    }

    fn check_rule(&mut self, location: &str, rule: &RuleValue, kind: RuleKind, has_default: bool) {
        match rule {
            RuleValue::Literal(value) => self.check_result(location, value, kind),
            RuleValue::Conditional(conditional) => {
                self.check_condition(&format!("{location}.when"), &conditional.when);
                self.check_result(&format!("{location}.then"), &conditional.then, kind);
                if kind == RuleKind::Action && !has_default {
                    self.push(
                        location,
                        "single conditional rule has no reachable default: set default_action on the state or flow",
                    );
                }
            }
            RuleValue::Chain(entries) => self.check_chain(location, entries, kind),
        }
    }

    fn check_chain(&mut self, location: &str, entries: &[RuleEntry], kind: RuleKind) {
        if entries.is_empty() {
            self.push(location, "rule list cannot be empty");
            return;
        }

        let last = entries.len() - 1;
        for (i, entry) in entries.iter().enumerate() {
            let entry_location = format!("{location}[{i}]");
            match entry {
                RuleEntry::Conditional(conditional) => {
                    self.check_condition(&format!("{entry_location}.when"), &conditional.when);
                    self.check_result(&format!("{entry_location}.then"), &conditional.then, kind);
                }
                RuleEntry::Default(value) => {
                    if i != last {
                        self.push(
                            &entry_location,
                            "default must be the last entry; entries after it are unreachable",
                        );
                    }
                    self.check_result(&entry_location, value, kind);
                }
            }
        }

        if matches!(entries[last], RuleEntry::Conditional(_)) {
            self.push(location, "rule list must end with a literal default");
        }
    }

    fn check_condition(&mut self, location: &str, expr: &ConditionExpr) {
        if expr.has_empty_combinator() {
            self.push(location, "all/any must list at least one condition");
        }
        let missing: Vec<String> = expr
            .referenced_names()
            .into_iter()
            .filter(|name| !self.conditions.contains(name))
            .map(str::to_string)
            .collect();
        for name in missing {
            self.push(location, format!("unknown condition '{name}'"));
        }
    }

    fn check_result(&mut self, location: &str, value: &str, kind: RuleKind) {
        match kind {
            RuleKind::Action => self.check_action_literal(location, value),
            RuleKind::Transition => {
                if value != STAY {
                    self.check_known_state(location, &StateName::from(value));
                }
            }
        }
    }

    fn check_action_literal(&mut self, location: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(location, "action cannot be empty");
        } else if value == STAY {
            self.push(location, "'none' is only valid in transitions");
        }
    }

    fn check_known_state(&mut self, location: &str, state: &StateName) {
        if !self.flow.has_state(state) {
            self.push(location, format!("unknown state '{state}'"));
        }
    }
}
