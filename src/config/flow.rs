//! Flow source configuration

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::flow::FlowConfig;

use super::error::ConfigError;

/// Where the conversation flow comes from
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FlowSettings {
    /// YAML flow document; the embedded flow is used when unset
    pub path: Option<PathBuf>,
}

impl FlowSettings {
    /// Read and parse the configured flow. Validation against the
    /// condition registry happens when the engine is built.
    pub fn load(&self) -> Result<FlowConfig, ConfigError> {
        match &self.path {
            None => Ok(FlowConfig::builtin()?),
            Some(path) => {
                let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::FlowUnreadable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                Ok(FlowConfig::from_yaml(&yaml)?)
            }
        }
    }
}
