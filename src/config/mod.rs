//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `DIALOGUE_ENGINE` prefix
//! and `__` between nested keys. Every value has a default, so an empty
//! environment yields a working in-memory engine on the embedded flow.
//!
//! # Example
//!
//! ```no_run
//! use dialogue_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod engine;
mod error;
mod flow;
pub mod logging;
mod storage;

pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use flow::FlowSettings;
pub use logging::{LogFormat, LoggingConfig};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

use crate::domain::engine::{DecisionEngine, EngineError};

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Engine limits and invocation mode
    #[serde(default)]
    pub engine: EngineConfig,

    /// Flow document location
    #[serde(default)]
    pub flow: FlowSettings,

    /// Snapshot storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log format and filter
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DIALOGUE_ENGINE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `DIALOGUE_ENGINE__ENGINE__GO_BACK_BUDGET=3` -> `engine.go_back_budget = 3`
    /// - `DIALOGUE_ENGINE__STORAGE__BACKEND=file` -> `storage.backend = file`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DIALOGUE_ENGINE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Build the decision engine this configuration describes.
    pub fn build_engine(&self) -> Result<DecisionEngine, ConfigError> {
        let flow = self.flow.load()?;
        DecisionEngine::builder()
            .flow(flow)
            .limits(self.engine.limits())
            .invocation(self.engine.invocation)
            .build()
            .map_err(|e| match e {
                EngineError::Configuration(inner) => ConfigError::Flow(inner),
                other => ConfigError::ValidationFailed(ValidationError::InvalidEngine(other.to_string())),
            })
    }
}
