//! Named predicate registry.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::foundation::panic_message;

use super::EvaluationContext;

/// Failure reported by a predicate that could not decide.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PredicateError {
    pub message: String,
}

impl PredicateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised by the condition registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConditionError {
    #[error("condition '{0}' is not registered")]
    NotFound(String),

    #[error("condition '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("invalid condition name '{0}': use lowercase letters, digits and underscores")]
    InvalidName(String),

    #[error("condition '{name}' failed: {message}")]
    Evaluation { name: String, message: String },
}

impl ConditionError {
    /// Name of the condition the error refers to.
    pub fn condition_name(&self) -> &str {
        match self {
            ConditionError::NotFound(name)
            | ConditionError::AlreadyRegistered(name)
            | ConditionError::InvalidName(name) => name,
            ConditionError::Evaluation { name, .. } => name,
        }
    }
}

/// A pure boolean predicate over the evaluation context.
pub type Predicate =
    Arc<dyn Fn(&EvaluationContext<'_>) -> Result<bool, PredicateError> + Send + Sync>;

/// Registry of named predicates.
///
/// Populated once at startup and shared read-only afterwards. Predicates
/// must be pure: evaluating the same name twice against the same context
/// yields the same answer.
#[derive(Clone, Default)]
pub struct ConditionRegistry {
    predicates: BTreeMap<String, Predicate>,
}

impl ConditionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in condition catalogue.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::register_all(&mut registry);
        registry
    }

    /// Registers a fallible predicate under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F) -> Result<(), ConditionError>
    where
        F: Fn(&EvaluationContext<'_>) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(ConditionError::InvalidName(name));
        }
        if self.predicates.contains_key(&name) {
            return Err(ConditionError::AlreadyRegistered(name));
        }
        self.predicates.insert(name, Arc::new(predicate));
        Ok(())
    }

    /// Registers a predicate that always decides.
    pub fn register_flag<F>(&mut self, name: impl Into<String>, predicate: F) -> Result<(), ConditionError>
    where
        F: Fn(&EvaluationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.register(name, move |ctx| Ok(predicate(ctx)))
    }

    /// Evaluates `name` against `ctx`.
    ///
    /// Predicate failures and panics surface as [`ConditionError::Evaluation`].
    pub fn evaluate(&self, name: &str, ctx: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
        let predicate = self
            .predicates
            .get(name)
            .ok_or_else(|| ConditionError::NotFound(name.to_string()))?;

        match panic::catch_unwind(AssertUnwindSafe(|| predicate(ctx))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ConditionError::Evaluation {
                name: name.to_string(),
                message: e.message,
            }),
            Err(payload) => Err(ConditionError::Evaluation {
                name: name.to_string(),
                message: format!("predicate panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionRegistry")
            .field("names", &self.predicates.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name.chars().next().map(|c| c.is_ascii_lowercase()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::super::testing::ContextFixture;
    use super::*;
    use serde_json::json;

    mod registration {
        use super::*;

        #[test]
        fn duplicate_name_is_rejected() {
            let mut registry = ConditionRegistry::new();
            registry.register_flag("always", |_| true).unwrap();

            let result = registry.register_flag("always", |_| false);
            assert_eq!(
                result,
                Err(ConditionError::AlreadyRegistered("always".to_string()))
            );
        }

        #[test]
        fn malformed_names_are_rejected() {
            let mut registry = ConditionRegistry::new();
            for name in ["", "Has-Data", "9lives", "has data"] {
                assert!(
                    matches!(
                        registry.register_flag(name, |_| true),
                        Err(ConditionError::InvalidName(_))
                    ),
                    "{name:?} should be rejected"
                );
            }
        }

        #[test]
        fn builtins_are_present() {
            let registry = ConditionRegistry::with_builtins();
            for name in ["has_company_size", "price_data_known", "can_go_back", "objection_limit_reached"] {
                assert!(registry.contains(name), "{name} missing");
            }
        }
    }

    mod evaluation {
        use super::*;

        #[test]
        fn unknown_name_is_not_found() {
            let registry = ConditionRegistry::new();
            let fixture = ContextFixture::new("situation", "provide_info");

            assert_eq!(
                registry.evaluate("missing", &fixture.context()),
                Err(ConditionError::NotFound("missing".to_string()))
            );
        }

        #[test]
        fn predicate_error_is_wrapped() {
            let mut registry = ConditionRegistry::new();
            registry
                .register("broken", |_| Err(PredicateError::new("no data source")))
                .unwrap();
            let fixture = ContextFixture::new("situation", "provide_info");

            let err = registry.evaluate("broken", &fixture.context()).unwrap_err();
            assert_eq!(
                err,
                ConditionError::Evaluation {
                    name: "broken".to_string(),
                    message: "no data source".to_string(),
                }
            );
        }

        #[test]
        fn predicate_panic_is_wrapped() {
            let mut registry = ConditionRegistry::new();
            registry
                .register_flag("explodes", |_| panic!("boom"))
                .unwrap();
            let fixture = ContextFixture::new("situation", "provide_info");

            let err = registry.evaluate("explodes", &fixture.context()).unwrap_err();
            assert!(matches!(
                &err,
                ConditionError::Evaluation { message, .. } if message.contains("boom")
            ));
            assert_eq!(err.condition_name(), "explodes");
        }

        #[test]
        fn every_builtin_is_idempotent() {
            let registry = ConditionRegistry::with_builtins();
            let fixture = ContextFixture::new("presentation", "objection_price")
                .preceded_by(&["objection_timing"])
                .with_data("company_size", json!(50))
                .with_extracted("pain_point", json!("manual reporting"));
            let ctx = fixture.context();

            for name in registry.names() {
                let first = registry.evaluate(name, &ctx);
                let second = registry.evaluate(name, &ctx);
                assert_eq!(first, second, "{name} is not idempotent");
                assert!(first.is_ok(), "{name} failed: {first:?}");
            }
        }
    }
}
