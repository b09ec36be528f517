//! Signals supplied by external analyzers alongside the classified intent.

use serde::{Deserialize, Serialize};

/// Direction the conversation is moving, as judged by an external analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Positive,
    #[default]
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    High,
    #[default]
    Medium,
    Low,
}

/// Opaque per-turn signals. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSignals {
    /// 0 (calm) to 10 (furious).
    pub frustration_level: u8,
    pub is_stuck: bool,
    pub has_oscillation: bool,
    pub momentum: Momentum,
    pub engagement: Engagement,
}
