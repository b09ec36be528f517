//! Intent history tracker.
//!
//! The one owner of "what did the user say, in what order". Guards and
//! conditions read it through the evaluation context; only the orchestrator
//! calls [`IntentHistoryTracker::record`], once per turn, before anything
//! else reads it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::domain::foundation::{Intent, StateName};

use super::IntentCategory;

/// Default number of records kept in the recent-history ring buffer.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One recorded user intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRecord {
    pub intent: Intent,
    pub state: StateName,
    pub category: IntentCategory,
    pub turn: u32,
}

/// Ordered intent history with streaks and lifetime totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentHistoryTracker {
    capacity: usize,
    records: VecDeque<IntentRecord>,
    last_intent: Option<Intent>,
    previous_intent: Option<Intent>,
    current_streak: u32,
    turns_recorded: u32,
    intent_totals: BTreeMap<Intent, u32>,
    category_totals: BTreeMap<IntentCategory, u32>,
}

impl Default for IntentHistoryTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl IntentHistoryTracker {
    /// Creates an empty tracker keeping at most `capacity` recent records.
    ///
    /// A zero capacity is raised to one so the last record is always queryable.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
            last_intent: None,
            previous_intent: None,
            current_streak: 0,
            turns_recorded: 0,
            intent_totals: BTreeMap::new(),
            category_totals: BTreeMap::new(),
        }
    }

    /// Records this turn's intent. Must be called exactly once per turn.
    pub fn record(&mut self, intent: Intent, state: StateName) -> IntentRecord {
        let category = IntentCategory::of(&intent);

        if self.last_intent.as_ref() == Some(&intent) {
            self.current_streak += 1;
        } else {
            self.current_streak = 1;
        }
        self.previous_intent = self.last_intent.replace(intent.clone());
        self.turns_recorded += 1;

        *self.intent_totals.entry(intent.clone()).or_insert(0) += 1;
        *self.category_totals.entry(category).or_insert(0) += 1;

        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        let record = IntentRecord {
            intent,
            state,
            category,
            turn: self.turns_recorded,
        };
        self.records.push_back(record.clone());
        record
    }

    /// Length of the current run of `intent`, or 0 if it is not the last intent.
    pub fn streak(&self, intent: &Intent) -> u32 {
        match &self.last_intent {
            Some(last) if last == intent => self.current_streak,
            _ => 0,
        }
    }

    /// Number of most recent records, walking backward, sharing `category`.
    pub fn category_consecutive(&self, category: IntentCategory) -> u32 {
        self.records
            .iter()
            .rev()
            .take_while(|record| record.category == category)
            .count() as u32
    }

    /// Lifetime count of `intent`.
    pub fn total(&self, intent: &Intent) -> u32 {
        self.intent_totals.get(intent).copied().unwrap_or(0)
    }

    /// Lifetime count of intents in `category`.
    pub fn category_total(&self, category: IntentCategory) -> u32 {
        self.category_totals.get(&category).copied().unwrap_or(0)
    }

    pub fn last_intent(&self) -> Option<&Intent> {
        self.last_intent.as_ref()
    }

    pub fn previous_intent(&self) -> Option<&Intent> {
        self.previous_intent.as_ref()
    }

    /// Category of the most recent record.
    pub fn last_category(&self) -> Option<IntentCategory> {
        self.records.back().map(|record| record.category)
    }

    pub fn last_record(&self) -> Option<&IntentRecord> {
        self.records.back()
    }

    /// The `n` most recent records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&IntentRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).collect()
    }

    /// Total number of turns ever recorded (not bounded by capacity).
    pub fn turns_recorded(&self) -> u32 {
        self.turns_recorded
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forgets everything. Used when a conversation is reset.
    pub fn clear(&mut self) {
        *self = Self::new(self.capacity);
    }
}
