//! Source registration and per-turn invocation.

use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use thiserror::Error;

use crate::domain::conditions::EvaluationContext;
use crate::domain::decision::{Proposal, SourceFailure};
use crate::domain::foundation::panic_message;

use super::source::{KnowledgeSource, SourceError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceRegistryError {
    #[error("knowledge source '{0}' is already registered")]
    DuplicateSource(String),

    #[error("no fallback knowledge source is registered")]
    MissingFallback,
}

/// How sources are invoked within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationMode {
    #[default]
    Sequential,
    /// One scoped thread per source. Results are still ordered by
    /// registration, never by completion.
    Parallel,
}

/// Proposals and failures gathered from one invocation round.
#[derive(Debug, Clone, Default)]
pub struct SourceOutput {
    pub proposals: Vec<Proposal>,
    pub failures: Vec<SourceFailure>,
}

/// Ordered set of knowledge sources. Registration order is the tie-break
/// for equal-priority proposals, so it is part of the engine's behaviour.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn KnowledgeSource>>,
    mode: InvocationMode,
}

impl SourceRegistry {
    pub fn new(mode: InvocationMode) -> Self {
        Self {
            sources: Vec::new(),
            mode,
        }
    }

    pub fn register(&mut self, source: Arc<dyn KnowledgeSource>) -> Result<(), SourceRegistryError> {
        if self.sources.iter().any(|s| s.id() == source.id()) {
            return Err(SourceRegistryError::DuplicateSource(source.id().to_string()));
        }
        self.sources.push(source);
        Ok(())
    }

    /// Fails unless some registered source is a fallback.
    pub fn ensure_fallback(&self) -> Result<(), SourceRegistryError> {
        if self.sources.iter().any(|s| s.is_fallback()) {
            Ok(())
        } else {
            Err(SourceRegistryError::MissingFallback)
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.id())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn mode(&self) -> InvocationMode {
        self.mode
    }

    /// Invokes every source against the same context.
    ///
    /// A failing or panicking source is isolated: its proposals are
    /// discarded, the failure is logged and reported, and the rest proceed.
    pub fn invoke(&self, ctx: &EvaluationContext<'_>) -> SourceOutput {
        let results: Vec<Result<Vec<Proposal>, SourceError>> = match self.mode {
            InvocationMode::Sequential => self
                .sources
                .iter()
                .enumerate()
                .map(|(order, source)| invoke_one(order, source.as_ref(), ctx))
                .collect(),
            InvocationMode::Parallel => thread::scope(|scope| {
                let handles: Vec<_> = self
                    .sources
                    .iter()
                    .enumerate()
                    .map(|(order, source)| {
                        let source = source.as_ref();
                        scope.spawn(move || invoke_one(order, source, ctx))
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle.join().unwrap_or_else(|payload| {
                            Err(SourceError::Panicked(panic_message(payload.as_ref())))
                        })
                    })
                    .collect()
            }),
        };

        let mut output = SourceOutput::default();
        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(proposals) => output.proposals.extend(proposals),
                Err(e) => {
                    tracing::error!(
                        conversation_id = %ctx.conversation_id,
                        source = %source.id(),
                        error = %e,
                        "knowledge source failed, discarding its proposals"
                    );
                    output.failures.push(SourceFailure {
                        source: source.id().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        output
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.ids().collect::<Vec<_>>())
            .field("mode", &self.mode)
            .finish()
    }
}

fn invoke_one(
    order: usize,
    source: &dyn KnowledgeSource,
    ctx: &EvaluationContext<'_>,
) -> Result<Vec<Proposal>, SourceError> {
    let proposals = panic::catch_unwind(AssertUnwindSafe(|| source.contribute(ctx)))
        .map_err(|payload| SourceError::Panicked(panic_message(payload.as_ref())))??;

    Ok(proposals
        .into_iter()
        .enumerate()
        .map(|(sequence, proposal)| proposal.stamped(source.id(), order, sequence))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conditions::testing::ContextFixture;
    use crate::domain::decision::Priority;

    struct Fixed {
        id: &'static str,
        action: &'static str,
        fallback: bool,
    }

    impl KnowledgeSource for Fixed {
        fn id(&self) -> &str {
            self.id
        }

        fn contribute(&self, _ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
            Ok(vec![Proposal::action(self.action, Priority::Normal)])
        }

        fn is_fallback(&self) -> bool {
            self.fallback
        }
    }

    struct Failing;

    impl KnowledgeSource for Failing {
        fn id(&self) -> &str {
            "failing"
        }

        fn contribute(&self, _ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
            Err(SourceError::failed("upstream unavailable"))
        }
    }

    struct Panicking;

    impl KnowledgeSource for Panicking {
        fn id(&self) -> &str {
            "panicking"
        }

        fn contribute(&self, _ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
            panic!("index out of bounds")
        }
    }

    fn fixed(id: &'static str, action: &'static str) -> Arc<dyn KnowledgeSource> {
        Arc::new(Fixed {
            id,
            action,
            fallback: false,
        })
    }

    fn registry(mode: InvocationMode) -> SourceRegistry {
        let mut registry = SourceRegistry::new(mode);
        registry.register(fixed("first", "a")).unwrap();
        registry.register(Arc::new(Failing)).unwrap();
        registry.register(Arc::new(Panicking)).unwrap();
        registry.register(fixed("last", "b")).unwrap();
        registry
    }

    mod registration {
        use super::*;

        #[test]
        fn duplicate_ids_are_rejected() {
            let mut registry = SourceRegistry::default();
            registry.register(fixed("same", "a")).unwrap();
            assert_eq!(
                registry.register(fixed("same", "b")),
                Err(SourceRegistryError::DuplicateSource("same".to_string()))
            );
        }

        #[test]
        fn missing_fallback_is_detected() {
            let mut registry = SourceRegistry::default();
            registry.register(fixed("plain", "a")).unwrap();
            assert_eq!(registry.ensure_fallback(), Err(SourceRegistryError::MissingFallback));

            registry
                .register(Arc::new(Fixed {
                    id: "fallback",
                    action: "continue_current_goal",
                    fallback: true,
                }))
                .unwrap();
            assert_eq!(registry.ensure_fallback(), Ok(()));
        }
    }

    mod invocation {
        use super::*;

        #[test]
        fn failures_are_isolated_sequentially() {
            let fixture = ContextFixture::new("situation", "provide_info");
            let output = registry(InvocationMode::Sequential).invoke(&fixture.context());

            let actions: Vec<_> = output.proposals.iter().map(|p| p.action.as_str()).collect();
            assert_eq!(actions, vec!["a", "b"]);
            let failed: Vec<_> = output.failures.iter().map(|f| f.source.as_str()).collect();
            assert_eq!(failed, vec!["failing", "panicking"]);
            assert!(output.failures[1].message.contains("index out of bounds"));
        }

        #[test]
        fn parallel_matches_sequential() {
            let fixture = ContextFixture::new("situation", "provide_info");
            let sequential = registry(InvocationMode::Sequential).invoke(&fixture.context());
            let parallel = registry(InvocationMode::Parallel).invoke(&fixture.context());

            assert_eq!(sequential.proposals, parallel.proposals);
            assert_eq!(sequential.failures, parallel.failures);
        }

        #[test]
        fn proposals_are_stamped_with_registration_order() {
            let fixture = ContextFixture::new("situation", "provide_info");
            let output = registry(InvocationMode::Sequential).invoke(&fixture.context());

            let last = output.proposals.iter().find(|p| p.source == "last").unwrap();
            assert_eq!(last.source_order, 3);
            assert_eq!(last.sequence, 0);
        }
    }
}
