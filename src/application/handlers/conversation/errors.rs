//! Conversions from engine and port errors into [`DomainError`].

use crate::domain::conversation::{RestorationError, SnapshotEncodingError, TransitionError};
use crate::domain::engine::EngineError;
use crate::domain::foundation::{ConversationId, DomainError, ErrorCode};
use crate::ports::SnapshotStoreError;

/// Also used when the conversation belongs to another tenant, so callers
/// cannot probe for conversations they do not own.
pub(super) fn conversation_not_found(id: ConversationId) -> DomainError {
    DomainError::new(
        ErrorCode::ConversationNotFound,
        format!("Conversation not found: {id}"),
    )
    .with_detail("conversation_id", id.to_string())
}

/// True if the snapshot was refused because it belongs to someone else.
pub(super) fn is_identity_mismatch(err: &RestorationError) -> bool {
    matches!(
        err,
        RestorationError::TenantMismatch { .. } | RestorationError::ConversationMismatch { .. }
    )
}

impl From<SnapshotStoreError> for DomainError {
    fn from(err: SnapshotStoreError) -> Self {
        match err {
            SnapshotStoreError::NotFound(id) => conversation_not_found(id),
            other => DomainError::new(ErrorCode::StorageError, other.to_string()),
        }
    }
}

impl From<RestorationError> for DomainError {
    fn from(err: RestorationError) -> Self {
        DomainError::new(ErrorCode::RestorationRejected, err.to_string())
    }
}

impl From<TransitionError> for DomainError {
    fn from(err: TransitionError) -> Self {
        DomainError::new(ErrorCode::InvalidStateTransition, err.to_string())
    }
}

impl From<SnapshotEncodingError> for DomainError {
    fn from(err: SnapshotEncodingError) -> Self {
        DomainError::new(ErrorCode::InternalError, err.to_string())
    }
}

impl From<EngineError> for DomainError {
    fn from(err: EngineError) -> Self {
        DomainError::new(ErrorCode::ConfigurationInvalid, err.to_string())
    }
}
