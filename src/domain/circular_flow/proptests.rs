//! Property-based tests for the go-back budget.

use proptest::prelude::*;
use std::collections::BTreeMap;

use super::CircularFlowManager;
use crate::domain::foundation::StateName;

fn arb_state() -> impl Strategy<Value = StateName> {
    prop::sample::select(vec![
        "greeting",
        "situation",
        "problem",
        "implication",
        "need_payoff",
        "presentation",
        "soft_close",
        "close",
    ])
    .prop_map(StateName::from)
}

proptest! {
    #[test]
    fn used_never_exceeds_budget(
        budget in 0u32..5,
        attempts in prop::collection::vec(arb_state(), 0..20),
    ) {
        let mut manager = CircularFlowManager::new(budget, BTreeMap::new());
        for (turn, from) in attempts.iter().enumerate() {
            if let Some(to) = manager.go_back_target(from) {
                let allowed = manager.can_go_back(from);
                let committed = manager.record_go_back(from, &to, turn as u32).is_ok();
                prop_assert_eq!(allowed, committed);
            }
            prop_assert!(manager.used() <= manager.budget());
            prop_assert!(manager.ledger().is_consistent());
        }
    }

    #[test]
    fn can_go_back_is_pure(budget in 0u32..4, from in arb_state()) {
        let manager = CircularFlowManager::new(budget, BTreeMap::new());
        let before = manager.clone();
        let first = manager.can_go_back(&from);
        prop_assert_eq!(first, manager.can_go_back(&from));
        prop_assert_eq!(manager, before);
    }
}
