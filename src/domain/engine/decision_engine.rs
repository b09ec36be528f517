//! The shared, immutable part of the engine.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::conditions::ConditionRegistry;
use crate::domain::decision::ConflictResolver;
use crate::domain::flow::{ConfigurationError, FlowConfig, FlowValidator};
use crate::domain::sources::{
    default_sources, InvocationMode, KnowledgeSource, SourceRegistry, SourceRegistryError,
};

use super::limits::EngineLimits;

/// Failures detected while assembling an engine. Nothing is served until
/// the flow, the sources and the limits have all been checked.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Sources(#[from] SourceRegistryError),

    #[error("invalid engine limits: {0}")]
    Limits(String),
}

/// Flow, conditions, sources and limits shared by all conversations.
///
/// Cloning is cheap; every clone points at the same configuration.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    flow: Arc<FlowConfig>,
    conditions: Arc<ConditionRegistry>,
    sources: Arc<SourceRegistry>,
    resolver: ConflictResolver,
    limits: EngineLimits,
}

impl DecisionEngine {
    pub fn builder() -> DecisionEngineBuilder {
        DecisionEngineBuilder::default()
    }

    /// The built-in flow with default conditions, sources and limits.
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::builder().build()
    }

    pub fn flow(&self) -> &FlowConfig {
        &self.flow
    }

    pub fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    pub fn resolver(&self) -> &ConflictResolver {
        &self.resolver
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }
}

pub struct DecisionEngineBuilder {
    flow: Option<FlowConfig>,
    conditions: ConditionRegistry,
    limits: EngineLimits,
    mode: InvocationMode,
    default_sources: bool,
    extra_sources: Vec<Arc<dyn KnowledgeSource>>,
}

impl Default for DecisionEngineBuilder {
    fn default() -> Self {
        Self {
            flow: None,
            conditions: ConditionRegistry::with_builtins(),
            limits: EngineLimits::default(),
            mode: InvocationMode::default(),
            default_sources: true,
            extra_sources: Vec::new(),
        }
    }
}

impl DecisionEngineBuilder {
    /// Uses `flow` instead of the built-in one.
    pub fn flow(mut self, flow: FlowConfig) -> Self {
        self.flow = Some(flow);
        self
    }

    /// Replaces the condition registry, built-ins included.
    pub fn conditions(mut self, conditions: ConditionRegistry) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn limits(mut self, limits: EngineLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn invocation(mut self, mode: InvocationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Registers an additional source after the canonical set.
    pub fn source(mut self, source: Arc<dyn KnowledgeSource>) -> Self {
        self.extra_sources.push(source);
        self
    }

    /// Skips the canonical sources; a fallback must then be supplied.
    pub fn without_default_sources(mut self) -> Self {
        self.default_sources = false;
        self
    }

    pub fn build(self) -> Result<DecisionEngine, EngineError> {
        self.limits.validate()?;

        let flow = match self.flow {
            Some(flow) => flow,
            None => FlowConfig::builtin()?,
        };
        FlowValidator::new(&flow, &self.conditions).validate()?;

        let conditions = Arc::new(self.conditions);
        let mut sources = SourceRegistry::new(self.mode);
        if self.default_sources {
            for source in default_sources(conditions.clone()) {
                sources.register(source)?;
            }
        }
        for source in self.extra_sources {
            sources.register(source)?;
        }
        sources.ensure_fallback()?;

        tracing::info!(
            flow = %flow.name,
            states = flow.states.len(),
            conditions = conditions.len(),
            sources = sources.len(),
            mode = ?sources.mode(),
            "decision engine ready"
        );

        Ok(DecisionEngine {
            flow: Arc::new(flow),
            conditions,
            sources: Arc::new(sources),
            resolver: ConflictResolver::default(),
            limits: self.limits,
        })
    }
}
