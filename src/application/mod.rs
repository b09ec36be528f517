//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer coordinates the decision engine with the snapshot store and
//! the audit log.

pub mod handlers;

pub use handlers::{
    ConversationView, EndConversationCommand, EndConversationHandler,
    GetConversationStateHandler, GetConversationStateQuery, ProcessTurnCommand,
    ProcessTurnHandler, ProcessTurnResult, StartConversationCommand, StartConversationHandler,
    StartConversationResult,
};
