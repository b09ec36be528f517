//! Property-based tests for conversation state transitions and snapshots.

use super::*;
use crate::domain::circular_flow::CircularFlowManager;
use crate::domain::flow::FlowConfig;
use crate::domain::foundation::{ConversationId, Intent, StateName, TenantId};
use crate::domain::intent::IntentHistoryTracker;
use proptest::prelude::*;
use serde_json::json;

fn arb_target() -> impl Strategy<Value = Option<StateName>> {
    prop_oneof![
        Just(None),
        Just(Some(StateName::from("situation"))),
        Just(Some(StateName::from("problem"))),
        Just(Some(StateName::from("handle_objection"))),
        Just(Some(StateName::from("presentation"))),
        Just(Some(StateName::from("no_such_state"))),
        Just(Some(StateName::from("limbo"))),
    ]
}

fn arb_updates() -> impl Strategy<Value = DataMap> {
    prop::collection::btree_map(
        prop_oneof![Just("company_size"), Just("industry"), Just("budget")].prop_map(String::from),
        (0u32..500).prop_map(|n| json!(n)),
        0..3,
    )
}

fn started(flow: &FlowConfig) -> ConversationState {
    ConversationState::start(ConversationId::new(), TenantId::new("acme").unwrap(), flow).unwrap()
}

proptest! {
    #[test]
    fn phase_always_matches_state(
        steps in prop::collection::vec((arb_target(), arb_updates()), 1..30),
    ) {
        let flow = FlowConfig::builtin().unwrap();
        let mut conversation = started(&flow);

        for (target, updates) in steps {
            let before = conversation.clone();
            let change = StateChange { next_state: target, action: "act".into(), data_updates: updates };
            if conversation.transition(&flow, change).is_err() {
                prop_assert_eq!(&conversation, &before);
            }
            prop_assert!(conversation.is_consistent_with(&flow));
        }
    }

    #[test]
    fn snapshot_restores_identically(
        steps in prop::collection::vec((arb_target(), arb_updates()), 0..15),
    ) {
        let flow = FlowConfig::builtin().unwrap();
        let mut conversation = started(&flow);
        let mut history = IntentHistoryTracker::new(8);
        let circular_flow = CircularFlowManager::for_flow(&flow, 2);

        for (target, updates) in steps {
            history.record(Intent::from("provide_info"), conversation.state().clone());
            let change = StateChange { next_state: target, action: "act".into(), data_updates: updates };
            let _ = conversation.transition(&flow, change);
        }

        let snapshot = ConversationSnapshot::capture(&conversation, &history, &circular_flow).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: ConversationSnapshot = serde_json::from_str(&json).unwrap();
        let restored = decoded
            .restore(conversation.conversation_id(), conversation.tenant_id(), &flow)
            .unwrap();

        prop_assert_eq!(restored.state, conversation);
        prop_assert_eq!(restored.history, history);
    }
}
