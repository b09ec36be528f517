//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod conversation;

pub use conversation::{
    ConversationView, EndConversationCommand, EndConversationHandler,
    GetConversationStateHandler, GetConversationStateQuery, ProcessTurnCommand,
    ProcessTurnHandler, ProcessTurnResult, StartConversationCommand, StartConversationHandler,
    StartConversationResult,
};
