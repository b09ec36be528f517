//! Property-based tests for the intent history tracker.

use super::*;
use crate::domain::foundation::{Intent, StateName};
use proptest::prelude::*;

fn arb_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        Just(Intent::from("greeting")),
        Just(Intent::from("provide_info")),
        Just(Intent::from("price_question")),
        Just(Intent::from("objection_price")),
        Just(Intent::from("objection_timing")),
        Just(Intent::from("agreement")),
        Just(Intent::from("request_human")),
    ]
}

proptest! {
    #[test]
    fn recording_n_times_yields_streak_n(intent in arb_intent(), n in 1u32..40) {
        let mut tracker = IntentHistoryTracker::default();
        for _ in 0..n {
            tracker.record(intent.clone(), StateName::from("situation"));
        }
        prop_assert_eq!(tracker.streak(&intent), n);
    }

    #[test]
    fn different_intent_resets_streak(
        first in arb_intent(),
        second in arb_intent(),
        n in 1u32..10,
    ) {
        prop_assume!(first != second);
        let mut tracker = IntentHistoryTracker::default();
        for _ in 0..n {
            tracker.record(first.clone(), StateName::from("situation"));
        }
        tracker.record(second.clone(), StateName::from("situation"));

        prop_assert_eq!(tracker.streak(&first), 0);
        prop_assert_eq!(tracker.streak(&second), 1);
    }

    #[test]
    fn buffer_never_exceeds_capacity(
        intents in prop::collection::vec(arb_intent(), 0..120),
        capacity in 1usize..60,
    ) {
        let mut tracker = IntentHistoryTracker::new(capacity);
        for intent in &intents {
            tracker.record(intent.clone(), StateName::from("situation"));
        }
        prop_assert!(tracker.len() <= capacity);
        prop_assert_eq!(tracker.turns_recorded() as usize, intents.len());
    }

    #[test]
    fn category_totals_sum_to_turns(intents in prop::collection::vec(arb_intent(), 0..80)) {
        let mut tracker = IntentHistoryTracker::default();
        for intent in &intents {
            tracker.record(intent.clone(), StateName::from("situation"));
        }
        let sum: u32 = IntentCategory::all()
            .iter()
            .map(|c| tracker.category_total(*c))
            .sum();
        prop_assert_eq!(sum, tracker.turns_recorded());
    }
}
