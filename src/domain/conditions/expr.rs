//! Composite condition expressions.

use serde::{Deserialize, Serialize};

use super::{ConditionError, ConditionRegistry, EvaluationContext};

/// A condition as written in a rule: a registered name, or an
/// `all` / `any` / `not` combination of nested expressions.
///
/// Combinators short-circuit left to right; an error stops evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionExpr {
    Named(String),
    All { all: Vec<ConditionExpr> },
    Any { any: Vec<ConditionExpr> },
    Not { not: Box<ConditionExpr> },
}

impl ConditionExpr {
    pub fn named(name: impl Into<String>) -> Self {
        ConditionExpr::Named(name.into())
    }

    pub fn all(exprs: impl IntoIterator<Item = ConditionExpr>) -> Self {
        ConditionExpr::All {
            all: exprs.into_iter().collect(),
        }
    }

    pub fn any(exprs: impl IntoIterator<Item = ConditionExpr>) -> Self {
        ConditionExpr::Any {
            any: exprs.into_iter().collect(),
        }
    }

    pub fn not(expr: ConditionExpr) -> Self {
        ConditionExpr::Not {
            not: Box::new(expr),
        }
    }

    /// Names referenced by this expression, in document order.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ConditionExpr::Named(name) => out.push(name),
            ConditionExpr::All { all: exprs } | ConditionExpr::Any { any: exprs } => {
                exprs.iter().for_each(|e| e.collect_names(out))
            }
            ConditionExpr::Not { not } => not.collect_names(out),
        }
    }

    /// True if some `all` or `any` list in this expression is empty.
    pub fn has_empty_combinator(&self) -> bool {
        match self {
            ConditionExpr::Named(_) => false,
            ConditionExpr::All { all: exprs } | ConditionExpr::Any { any: exprs } => {
                exprs.is_empty() || exprs.iter().any(ConditionExpr::has_empty_combinator)
            }
            ConditionExpr::Not { not } => not.has_empty_combinator(),
        }
    }

    pub fn evaluate(
        &self,
        registry: &ConditionRegistry,
        ctx: &EvaluationContext<'_>,
    ) -> Result<bool, ConditionError> {
        match self {
            ConditionExpr::Named(name) => registry.evaluate(name, ctx),
            ConditionExpr::All { all } => {
                for expr in all {
                    if !expr.evaluate(registry, ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ConditionExpr::Any { any } => {
                for expr in any {
                    if expr.evaluate(registry, ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ConditionExpr::Not { not } => Ok(!not.evaluate(registry, ctx)?),
        }
    }
}

impl std::fmt::Display for ConditionExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(f: &mut std::fmt::Formatter<'_>, op: &str, exprs: &[ConditionExpr]) -> std::fmt::Result {
            write!(f, "{op}(")?;
            for (i, expr) in exprs.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{expr}")?;
            }
            f.write_str(")")
        }

        match self {
            ConditionExpr::Named(name) => f.write_str(name),
            ConditionExpr::All { all } => join(f, "all", all),
            ConditionExpr::Any { any } => join(f, "any", any),
            ConditionExpr::Not { not } => write!(f, "not({not})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::ContextFixture;
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn registry_with_counters() -> (ConditionRegistry, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let mut registry = ConditionRegistry::new();
        registry.register_flag("yes", |_| true).unwrap();
        registry.register_flag("no", |_| false).unwrap();
        let counter = calls.clone();
        registry
            .register_flag("counted", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
            .unwrap();
        (registry, calls)
    }

    #[test]
    fn parses_nested_yaml() {
        let expr: ConditionExpr =
            serde_yaml::from_str("{ all: [has_pain_point, { not: { any: [is_stuck, has_oscillation] } }] }")
                .unwrap();
        assert_eq!(
            expr,
            ConditionExpr::all([
                ConditionExpr::named("has_pain_point"),
                ConditionExpr::not(ConditionExpr::any([
                    ConditionExpr::named("is_stuck"),
                    ConditionExpr::named("has_oscillation"),
                ])),
            ])
        );
        assert_eq!(
            expr.to_string(),
            "all(has_pain_point, not(any(is_stuck, has_oscillation)))"
        );
    }

    #[test]
    fn all_short_circuits_on_first_false() {
        let (registry, calls) = registry_with_counters();
        let fixture = ContextFixture::new("situation", "provide_info");
        let expr = ConditionExpr::all([ConditionExpr::named("no"), ConditionExpr::named("counted")]);

        assert!(!expr.evaluate(&registry, &fixture.context()).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn any_short_circuits_on_first_true() {
        let (registry, calls) = registry_with_counters();
        let fixture = ContextFixture::new("situation", "provide_info");
        let expr = ConditionExpr::any([ConditionExpr::named("yes"), ConditionExpr::named("counted")]);

        assert!(expr.evaluate(&registry, &fixture.context()).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn not_inverts() {
        let (registry, _) = registry_with_counters();
        let fixture = ContextFixture::new("situation", "provide_info");
        let expr = ConditionExpr::not(ConditionExpr::named("no"));
        assert!(expr.evaluate(&registry, &fixture.context()).unwrap());
    }

    #[test]
    fn unknown_name_propagates_not_found() {
        let (registry, _) = registry_with_counters();
        let fixture = ContextFixture::new("situation", "provide_info");
        let expr = ConditionExpr::any([ConditionExpr::named("no"), ConditionExpr::named("missing")]);

        assert!(matches!(
            expr.evaluate(&registry, &fixture.context()),
            Err(ConditionError::NotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn detects_empty_combinators() {
        assert!(ConditionExpr::all([]).has_empty_combinator());
        assert!(ConditionExpr::not(ConditionExpr::any([])).has_empty_combinator());
        assert!(!ConditionExpr::named("yes").has_empty_combinator());
    }
}
