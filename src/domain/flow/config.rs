//! Flow configuration: the states of a conversation, the phase each state
//! belongs to, and the declarative rules and transitions per intent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{Intent, Phase, StateName};
use crate::domain::intent::IntentCategory;

use super::rule::RuleValue;
use super::validation::ConfigurationError;

/// Rule key matching any intent in a category, e.g. `category:objection`.
pub const CATEGORY_KEY_PREFIX: &str = "category:";

/// Rule key matching every intent.
pub const WILDCARD_KEY: &str = "*";

const BUILTIN_SPIN_FLOW: &str = include_str!("../../../flows/spin_selling.yaml");

/// One state of a flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    /// Phase this state belongs to. Defaults to the state name.
    #[serde(default)]
    pub phase: Option<Phase>,

    /// What the agent is trying to achieve here; carried by fallback proposals.
    #[serde(default)]
    pub goal: Option<String>,

    /// Data fields this state exists to collect.
    #[serde(default)]
    pub required_data: Vec<String>,

    /// Intent key → action rule.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleValue>,

    /// Intent key → transition rule.
    #[serde(default)]
    pub transitions: BTreeMap<String, RuleValue>,

    /// Action used when a single-condition rule does not match.
    #[serde(default)]
    pub default_action: Option<String>,

    /// Where the loop guard escapes to when the conversation is stuck here.
    #[serde(default)]
    pub escape_to: Option<StateName>,

    /// Entering this state records the previous state as the one to resume.
    #[serde(default)]
    pub objection_handling: bool,

    #[serde(default, rename = "final")]
    pub is_final: bool,
}

/// A complete, declarative conversation flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    pub name: String,
    pub entry_state: StateName,

    /// Flow-wide action used when a single-condition rule does not match
    /// and the state has no default of its own.
    #[serde(default)]
    pub default_action: Option<String>,

    /// State the objection-limit guard sends the conversation to.
    #[serde(default)]
    pub objection_limit_target: Option<StateName>,

    /// State the escalation guard hands the conversation off to.
    #[serde(default)]
    pub escalation_target: Option<StateName>,

    /// Explicit go-back targets, overriding the static default map.
    #[serde(default)]
    pub go_back: BTreeMap<StateName, StateName>,

    pub states: BTreeMap<StateName, StateConfig>,
}

impl FlowConfig {
    /// Parses a flow document. Parsing does not validate references;
    /// run [`super::FlowValidator`] before using the flow.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    /// The consultative-sales flow shipped with the crate.
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_yaml(BUILTIN_SPIN_FLOW)
    }

    pub fn state(&self, name: &StateName) -> Option<&StateConfig> {
        self.states.get(name)
    }

    pub fn has_state(&self, name: &StateName) -> bool {
        self.states.contains_key(name)
    }

    /// The phase of `state`, or `None` if the state is not part of this flow.
    pub fn phase_for(&self, state: &StateName) -> Option<Phase> {
        self.states.get(state).map(|config| {
            config
                .phase
                .clone()
                .unwrap_or_else(|| Phase::new(state.as_str()))
        })
    }

    pub fn is_final(&self, state: &StateName) -> bool {
        self.states.get(state).map(|c| c.is_final).unwrap_or(false)
    }

    pub fn is_objection_handling(&self, state: &StateName) -> bool {
        self.states
            .get(state)
            .map(|c| c.objection_handling)
            .unwrap_or(false)
    }

    /// Action rule for `intent` in `state`, looked up by exact intent,
    /// then `category:<name>`, then `*`.
    pub fn rule_for(&self, state: &StateName, intent: &Intent) -> Option<(String, &RuleValue)> {
        let config = self.states.get(state)?;
        lookup(&config.rules, intent)
    }

    /// Transition rule for `intent` in `state`, same lookup order as rules.
    pub fn transition_for(
        &self,
        state: &StateName,
        intent: &Intent,
    ) -> Option<(String, &RuleValue)> {
        let config = self.states.get(state)?;
        lookup(&config.transitions, intent)
    }

    /// Default action of a state, falling back to the flow default.
    pub fn default_action_for(&self, state: &StateName) -> Option<&str> {
        self.states
            .get(state)
            .and_then(|c| c.default_action.as_deref())
            .or(self.default_action.as_deref())
    }

    /// Goal of a state; the state name when none is configured.
    pub fn goal_for<'a>(&'a self, state: &'a StateName) -> &'a str {
        self.states
            .get(state)
            .and_then(|c| c.goal.as_deref())
            .unwrap_or(state.as_str())
    }

    pub fn required_data(&self, state: &StateName) -> &[String] {
        self.states
            .get(state)
            .map(|c| c.required_data.as_slice())
            .unwrap_or(&[])
    }
}

fn lookup<'a>(
    table: &'a BTreeMap<String, RuleValue>,
    intent: &Intent,
) -> Option<(String, &'a RuleValue)> {
    let category_key = format!("{CATEGORY_KEY_PREFIX}{}", IntentCategory::of(intent));
    let found = [intent.as_str(), category_key.as_str(), WILDCARD_KEY]
        .into_iter()
        .find_map(|key| table.get(key).map(|rule| (key.to_string(), rule)));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOW: &str = r#"
name: tiny
entry_state: start
default_action: continue_current_goal
states:
  start:
    goal: say_hello
    rules:
      greeting: greet_back
      "category:objection": handle_objection
      "*": acknowledge
    transitions:
      greeting: middle
  middle:
    phase: discovery
    required_data: [company_size]
  done:
    final: true
"#;

    fn flow() -> FlowConfig {
        FlowConfig::from_yaml(FLOW).unwrap()
    }

    #[test]
    fn phase_defaults_to_state_name() {
        let flow = flow();
        assert_eq!(flow.phase_for(&"start".into()), Some(Phase::from("start")));
        assert_eq!(flow.phase_for(&"middle".into()), Some(Phase::from("discovery")));
        assert_eq!(flow.phase_for(&"missing".into()), None);
    }

    #[test]
    fn rule_lookup_prefers_exact_then_category_then_wildcard() {
        let flow = flow();
        let start = StateName::from("start");

        let (key, _) = flow.rule_for(&start, &"greeting".into()).unwrap();
        assert_eq!(key, "greeting");

        let (key, _) = flow.rule_for(&start, &"objection_price".into()).unwrap();
        assert_eq!(key, "category:objection");

        let (key, _) = flow.rule_for(&start, &"provide_info".into()).unwrap();
        assert_eq!(key, "*");
    }

    #[test]
    fn missing_transition_is_none() {
        let flow = flow();
        assert!(flow.transition_for(&"start".into(), &"agreement".into()).is_none());
        assert!(flow.transition_for(&"nowhere".into(), &"greeting".into()).is_none());
    }

    #[test]
    fn default_action_falls_back_to_flow() {
        let flow = flow();
        assert_eq!(
            flow.default_action_for(&"middle".into()),
            Some("continue_current_goal")
        );
    }

    #[test]
    fn goal_falls_back_to_state_name() {
        let flow = flow();
        let start = StateName::from("start");
        let middle = StateName::from("middle");
        assert_eq!(flow.goal_for(&start), "say_hello");
        assert_eq!(flow.goal_for(&middle), "middle");
    }

    #[test]
    fn final_flag_parses() {
        let flow = flow();
        assert!(flow.is_final(&"done".into()));
        assert!(!flow.is_final(&"start".into()));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = "name: x\nentry_state: a\nstates:\n  a:\n    phaze: typo\n";
        assert!(matches!(
            FlowConfig::from_yaml(yaml),
            Err(ConfigurationError::Parse(_))
        ));
    }

    #[test]
    fn builtin_flow_parses() {
        let flow = FlowConfig::builtin().unwrap();
        assert_eq!(flow.name, "spin_selling");
        assert!(flow.has_state(&flow.entry_state));
    }
}
