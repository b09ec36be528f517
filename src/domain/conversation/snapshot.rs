//! Serializable conversation snapshots.
//!
//! A snapshot bundles everything a conversation needs to resume: its state,
//! the intent history and the go-back ledger. It is bound to one
//! conversation and one tenant, and carries a SHA-256 checksum of the payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::domain::circular_flow::{CircularFlowManager, GoBackLedger};
use crate::domain::flow::FlowConfig;
use crate::domain::foundation::{ConversationId, StateName, TenantId};
use crate::domain::intent::IntentHistoryTracker;

use super::state::ConversationState;

/// Bumped whenever the payload layout changes incompatibly.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RestorationError {
    #[error("snapshot schema version {found} is not supported (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("snapshot belongs to conversation {found}, not {expected}")]
    ConversationMismatch {
        expected: ConversationId,
        found: ConversationId,
    },

    #[error("snapshot belongs to tenant '{found}', not '{expected}'")]
    TenantMismatch { expected: TenantId, found: TenantId },

    #[error("snapshot was taken under flow '{found}', not '{expected}'")]
    FlowMismatch { expected: String, found: String },

    #[error("snapshot checksum does not match its payload")]
    ChecksumMismatch,

    #[error("snapshot state '{0}' is not part of the active flow")]
    UnknownState(StateName),

    #[error("snapshot is malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to encode snapshot payload: {0}")]
pub struct SnapshotEncodingError(String);

/// The checksummed part of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub conversation: ConversationState,
    pub history: IntentHistoryTracker,
    pub go_back: GoBackLedger,
}

impl SnapshotPayload {
    fn checksum(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Everything restored from a snapshot.
#[derive(Debug, Clone)]
pub struct RestoredConversation {
    pub state: ConversationState,
    pub history: IntentHistoryTracker,
    pub circular_flow: CircularFlowManager,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub schema_version: u32,
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
    pub flow_name: String,
    pub taken_at: DateTime<Utc>,
    pub payload: SnapshotPayload,
    pub checksum: String,
}

impl ConversationSnapshot {
    pub fn capture(
        state: &ConversationState,
        history: &IntentHistoryTracker,
        circular_flow: &CircularFlowManager,
    ) -> Result<Self, SnapshotEncodingError> {
        let payload = SnapshotPayload {
            conversation: state.clone(),
            history: history.clone(),
            go_back: circular_flow.ledger().clone(),
        };
        let checksum = payload
            .checksum()
            .map_err(|e| SnapshotEncodingError(e.to_string()))?;

        Ok(Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            conversation_id: state.conversation_id(),
            tenant_id: state.tenant_id().clone(),
            flow_name: state.flow_name().to_string(),
            taken_at: Utc::now(),
            payload,
            checksum,
        })
    }

    /// Verifies the snapshot against the caller's expectations and rebuilds
    /// the per-conversation components. Nothing is partially restored.
    pub fn restore(
        self,
        expected_id: ConversationId,
        expected_tenant: &TenantId,
        flow: &FlowConfig,
    ) -> Result<RestoredConversation, RestorationError> {
        if self.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(RestorationError::SchemaVersion {
                found: self.schema_version,
                expected: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        self.check_identity(expected_id, expected_tenant, flow)?;

        let checksum = self
            .payload
            .checksum()
            .map_err(|e| RestorationError::Malformed(e.to_string()))?;
        if checksum != self.checksum {
            return Err(RestorationError::ChecksumMismatch);
        }

        let SnapshotPayload {
            conversation,
            history,
            go_back,
        } = self.payload;

        if !flow.has_state(conversation.state()) {
            return Err(RestorationError::UnknownState(conversation.state().clone()));
        }
        if !conversation.is_consistent_with(flow) {
            return Err(RestorationError::Malformed(format!(
                "phase '{}' does not belong to state '{}'",
                conversation.phase(),
                conversation.state()
            )));
        }
        if !go_back.is_consistent() {
            return Err(RestorationError::Malformed(
                "go-back ledger counters are inconsistent".to_string(),
            ));
        }

        Ok(RestoredConversation {
            state: conversation,
            history,
            circular_flow: CircularFlowManager::from_ledger(go_back, flow),
        })
    }

    fn check_identity(
        &self,
        expected_id: ConversationId,
        expected_tenant: &TenantId,
        flow: &FlowConfig,
    ) -> Result<(), RestorationError> {
        let inner = &self.payload.conversation;

        for found in [self.conversation_id, inner.conversation_id()] {
            if found != expected_id {
                return Err(RestorationError::ConversationMismatch {
                    expected: expected_id,
                    found,
                });
            }
        }
        for found in [&self.tenant_id, inner.tenant_id()] {
            if found != expected_tenant {
                return Err(RestorationError::TenantMismatch {
                    expected: expected_tenant.clone(),
                    found: found.clone(),
                });
            }
        }
        for found in [self.flow_name.as_str(), inner.flow_name()] {
            if found != flow.name {
                return Err(RestorationError::FlowMismatch {
                    expected: flow.name.clone(),
                    found: found.to_string(),
                });
            }
        }
        Ok(())
    }
}
