//! Conversation command and query handlers.
//!
//! Start a conversation, process its turns, read its state and end it.

mod end_conversation;
mod errors;
mod get_conversation_state;
mod process_turn;
mod start_conversation;

pub use end_conversation::{EndConversationCommand, EndConversationHandler};
pub use get_conversation_state::{
    ConversationView, GetConversationStateHandler, GetConversationStateQuery,
};
pub use process_turn::{ProcessTurnCommand, ProcessTurnHandler, ProcessTurnResult};
pub use start_conversation::{
    StartConversationCommand, StartConversationHandler, StartConversationResult,
};
