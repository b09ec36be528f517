//! Property-based tests for conflict resolution.

use proptest::prelude::*;
use serde_json::json;

use super::{ConflictResolver, Priority, Proposal};
use crate::domain::conversation::DataMap;
use crate::domain::flow::FlowConfig;
use crate::domain::foundation::StateName;

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Normal),
        Just(Priority::High),
        Just(Priority::Critical),
    ]
}

fn arb_target() -> impl Strategy<Value = StateName> {
    prop::sample::select(vec!["situation", "problem", "soft_close", "escalated", "nowhere"])
        .prop_map(StateName::from)
}

fn arb_proposal() -> impl Strategy<Value = Proposal> {
    let action = (arb_priority(), any::<bool>(), "[a-z]{1,6}").prop_map(|(p, combinable, name)| {
        let proposal = Proposal::action(name, p);
        if combinable { proposal } else { proposal.blocking() }
    });
    let transition = (arb_priority(), any::<bool>(), arb_target()).prop_map(|(p, combinable, target)| {
        let proposal = Proposal::transition(format!("to_{target}"), target, p);
        if combinable { proposal } else { proposal.blocking() }
    });
    let data = (arb_priority(), "[a-c]", 0i64..5).prop_map(|(p, key, value)| {
        Proposal::data_update(DataMap::from([(key, json!(value))]), p)
    });
    prop_oneof![action, transition, data]
}

/// Proposals stamped as if each came from its own registered source.
fn arb_stamped_set() -> impl Strategy<Value = Vec<Proposal>> {
    prop::collection::vec(arb_proposal(), 0..12).prop_map(|proposals| {
        proposals
            .into_iter()
            .enumerate()
            .map(|(order, p)| p.stamped(format!("source_{order}"), order, 0))
            .collect()
    })
}

proptest! {
    #[test]
    fn resolution_ignores_invocation_order(
        (original, shuffled) in arb_stamped_set()
            .prop_flat_map(|set| (Just(set.clone()), Just(set).prop_shuffle()))
    ) {
        let flow = FlowConfig::builtin().unwrap();
        let current = StateName::from("situation");
        let resolver = ConflictResolver::default();

        let a = resolver.resolve(original, &flow, &current);
        let b = resolver.resolve(shuffled, &flow, &current);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn resolved_transition_targets_a_known_state(set in arb_stamped_set()) {
        let flow = FlowConfig::builtin().unwrap();
        let decision = ConflictResolver::default().resolve(set, &flow, &StateName::from("situation"));
        if let Some(target) = decision.next_state.target() {
            prop_assert!(flow.has_state(target));
        }
        prop_assert!(!decision.action.trim().is_empty());
    }
}
