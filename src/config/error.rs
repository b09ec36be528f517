//! Configuration error types

use thiserror::Error;

use crate::domain::flow::ConfigurationError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Failed to read flow file {path}: {reason}")]
    FlowUnreadable { path: String, reason: String },

    #[error("Flow configuration rejected: {0}")]
    Flow(#[from] ConfigurationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("frustration_handoff_level must be between 1 and 10")]
    InvalidFrustrationLevel,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),

    #[error("Invalid engine settings: {0}")]
    InvalidEngine(String),
}
