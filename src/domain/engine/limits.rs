//! Numeric limits shared by every conversation of an engine.

use serde::{Deserialize, Serialize};

use crate::domain::circular_flow::DEFAULT_GO_BACK_BUDGET;
use crate::domain::intent::DEFAULT_HISTORY_CAPACITY;

use super::EngineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Go-backs allowed per conversation. Zero disables going back.
    pub go_back_budget: u32,
    pub history_capacity: usize,
    pub max_consecutive_objections: u32,
    pub max_total_objections: u32,
    /// Escalation requests before handing off to a human.
    pub escalation_threshold: u32,
    /// Frustration level (0-10) at which the conversation is handed off.
    pub frustration_handoff_level: u8,
    /// Repeats of the same intent in one state before the loop is broken.
    pub repetition_threshold: u32,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            go_back_budget: DEFAULT_GO_BACK_BUDGET,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_consecutive_objections: 3,
            max_total_objections: 5,
            escalation_threshold: 2,
            frustration_handoff_level: 9,
            repetition_threshold: 3,
        }
    }
}

impl EngineLimits {
    pub fn validate(&self) -> Result<(), EngineError> {
        let zero = [
            ("history_capacity", self.history_capacity == 0),
            ("max_consecutive_objections", self.max_consecutive_objections == 0),
            ("max_total_objections", self.max_total_objections == 0),
            ("escalation_threshold", self.escalation_threshold == 0),
            ("repetition_threshold", self.repetition_threshold == 0),
        ];
        if let Some((field, _)) = zero.iter().find(|(_, is_zero)| *is_zero) {
            return Err(EngineError::Limits(format!("{field} must be greater than zero")));
        }
        if !(1..=10).contains(&self.frustration_handoff_level) {
            return Err(EngineError::Limits(format!(
                "frustration_handoff_level must be between 1 and 10, got {}",
                self.frustration_handoff_level
            )));
        }
        if self.max_consecutive_objections > self.max_total_objections {
            return Err(EngineError::Limits(
                "max_consecutive_objections cannot exceed max_total_objections".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineLimits::default().validate().is_ok());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let limits = EngineLimits {
            repetition_threshold: 0,
            ..EngineLimits::default()
        };
        let err = limits.validate().unwrap_err();
        assert!(err.to_string().contains("repetition_threshold"));
    }

    #[test]
    fn zero_go_back_budget_is_allowed() {
        let limits = EngineLimits {
            go_back_budget: 0,
            ..EngineLimits::default()
        };
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn frustration_level_is_bounded() {
        let limits = EngineLimits {
            frustration_handoff_level: 11,
            ..EngineLimits::default()
        };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let limits: EngineLimits = serde_yaml::from_str("go_back_budget: 4").unwrap();
        assert_eq!(limits.go_back_budget, 4);
        assert_eq!(limits.max_total_objections, 5);
    }
}
