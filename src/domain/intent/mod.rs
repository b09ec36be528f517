//! Intent history domain module.
//!
//! Classifies intents into categories once, at record time, and keeps the
//! ordered history that streak and limit guards depend on.

mod category;
mod history;

#[cfg(test)]
mod proptests;

pub use category::IntentCategory;
pub use history::{IntentHistoryTracker, IntentRecord, DEFAULT_HISTORY_CAPACITY};
