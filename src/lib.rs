//! Dialogue Engine - per-turn decision engine for guided conversations
//!
//! Each user turn is classified upstream into an intent plus extracted data.
//! Independent knowledge sources propose actions, transitions and data
//! updates; a conflict resolver reduces them to one decision, which is
//! applied to the conversation state atomically.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
