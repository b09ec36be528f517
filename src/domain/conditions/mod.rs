//! Conditions - named pure predicates over a per-turn context.
//!
//! Rules in a flow refer to conditions by name; the registry resolves
//! those names to predicates and evaluates them against an
//! [`EvaluationContext`].

mod builtin;
mod context;
mod expr;
mod registry;
mod signals;

#[cfg(test)]
pub(crate) mod testing;

pub use builtin::{builtin_names, FRUSTRATION_HIGH};
pub use context::EvaluationContext;
pub use expr::ConditionExpr;
pub use registry::{ConditionError, ConditionRegistry, Predicate, PredicateError};
pub use signals::{Engagement, ExternalSignals, Momentum};
