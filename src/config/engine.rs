//! Engine configuration

use serde::Deserialize;

use crate::domain::engine::EngineLimits;
use crate::domain::sources::InvocationMode;

use super::error::ValidationError;

/// Engine limits and source invocation mode
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default = "default_go_back_budget")]
    pub go_back_budget: u32,

    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    #[serde(default = "default_max_consecutive_objections")]
    pub max_consecutive_objections: u32,

    #[serde(default = "default_max_total_objections")]
    pub max_total_objections: u32,

    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: u32,

    #[serde(default = "default_frustration_handoff_level")]
    pub frustration_handoff_level: u8,

    #[serde(default = "default_repetition_threshold")]
    pub repetition_threshold: u32,

    /// `sequential` or `parallel`
    #[serde(default)]
    pub invocation: InvocationMode,
}

impl EngineConfig {
    pub fn limits(&self) -> EngineLimits {
        EngineLimits {
            go_back_budget: self.go_back_budget,
            history_capacity: self.history_capacity,
            max_consecutive_objections: self.max_consecutive_objections,
            max_total_objections: self.max_total_objections,
            escalation_threshold: self.escalation_threshold,
            frustration_handoff_level: self.frustration_handoff_level,
            repetition_threshold: self.repetition_threshold,
        }
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_capacity == 0 {
            return Err(ValidationError::MustBePositive("engine.history_capacity"));
        }
        if self.max_consecutive_objections == 0 {
            return Err(ValidationError::MustBePositive("engine.max_consecutive_objections"));
        }
        if self.max_total_objections == 0 {
            return Err(ValidationError::MustBePositive("engine.max_total_objections"));
        }
        if self.escalation_threshold == 0 {
            return Err(ValidationError::MustBePositive("engine.escalation_threshold"));
        }
        if self.repetition_threshold == 0 {
            return Err(ValidationError::MustBePositive("engine.repetition_threshold"));
        }
        if !(1..=10).contains(&self.frustration_handoff_level) {
            return Err(ValidationError::InvalidFrustrationLevel);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            go_back_budget: default_go_back_budget(),
            history_capacity: default_history_capacity(),
            max_consecutive_objections: default_max_consecutive_objections(),
            max_total_objections: default_max_total_objections(),
            escalation_threshold: default_escalation_threshold(),
            frustration_handoff_level: default_frustration_handoff_level(),
            repetition_threshold: default_repetition_threshold(),
            invocation: InvocationMode::default(),
        }
    }
}

fn default_go_back_budget() -> u32 {
    EngineLimits::default().go_back_budget
}

fn default_history_capacity() -> usize {
    EngineLimits::default().history_capacity
}

fn default_max_consecutive_objections() -> u32 {
    EngineLimits::default().max_consecutive_objections
}

fn default_max_total_objections() -> u32 {
    EngineLimits::default().max_total_objections
}

fn default_escalation_threshold() -> u32 {
    EngineLimits::default().escalation_threshold
}

fn default_frustration_handoff_level() -> u8 {
    EngineLimits::default().frustration_handoff_level
}

fn default_repetition_threshold() -> u32 {
    EngineLimits::default().repetition_threshold
}
