//! Domain layer containing the dialogue decision engine.
//!
//! # Module Organization
//!
//! - `foundation` - Identifiers, names and shared error types
//! - `intent` - Intent categories and the intent history tracker
//! - `conditions` - Named predicates and the per-turn evaluation context
//! - `flow` - Declarative flow configuration, rule grammar and validation
//! - `circular_flow` - Bounded go-back handling
//! - `decision` - Proposals and conflict resolution
//! - `sources` - Pluggable knowledge sources
//! - `conversation` - Conversation state and snapshots
//! - `engine` - Shared engine and per-conversation orchestrator

pub mod circular_flow;
pub mod conditions;
pub mod conversation;
pub mod decision;
pub mod engine;
pub mod flow;
pub mod foundation;
pub mod intent;
pub mod sources;
