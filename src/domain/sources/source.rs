//! The knowledge source contract.

use thiserror::Error;

use crate::domain::conditions::EvaluationContext;
use crate::domain::decision::Proposal;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("source failed: {message}")]
    Failed { message: String },

    #[error("source panicked: {0}")]
    Panicked(String),
}

impl SourceError {
    pub fn failed(message: impl Into<String>) -> Self {
        SourceError::Failed {
            message: message.into(),
        }
    }
}

/// An independent decision contributor.
///
/// Sources are stateless and read the conversation only through the
/// evaluation context; they never mutate it. Each call returns zero or more
/// proposals for the current turn.
pub trait KnowledgeSource: Send + Sync {
    /// Stable identifier, unique within a registry.
    fn id(&self) -> &str;

    fn contribute(&self, ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError>;

    /// True for a source that always proposes something. A registry must
    /// contain at least one.
    fn is_fallback(&self) -> bool {
        false
    }
}
