//! Conversation domain module.
//!
//! Per-conversation state: where the dialogue is, what has been collected,
//! and how to persist and restore it.

mod collected_data;
mod snapshot;
mod state;

#[cfg(test)]
mod proptests;

pub use collected_data::{CollectedData, DataMap};
pub use snapshot::{
    ConversationSnapshot, RestorationError, RestoredConversation, SnapshotEncodingError,
    SnapshotPayload, SNAPSHOT_SCHEMA_VERSION,
};
pub use state::{ConversationState, StateChange, TransitionError, TransitionReport};
