//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, string-backed names and error types
//! that form the vocabulary of the dialogue engine.

mod errors;
mod ids;
mod names;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub(crate) use errors::panic_message;
pub use ids::{ConversationId, TenantId};
pub use names::{Intent, Phase, StateName};
