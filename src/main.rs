//! JSON-lines driver.
//!
//! Reads one turn per line from stdin and writes one outcome per line to
//! stdout. Lines without a `conversation_id` belong to a conversation
//! created for this run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use dialogue_engine::adapters::{FileSnapshotStore, InMemoryAuditLog, InMemorySnapshotStore};
use dialogue_engine::application::{ProcessTurnCommand, ProcessTurnHandler};
use dialogue_engine::config::{logging, AppConfig, StorageBackend, ValidationError};
use dialogue_engine::domain::engine::{TurnInput, TurnOutcome};
use dialogue_engine::domain::foundation::{ConversationId, DomainError, TenantId};
use dialogue_engine::ports::SnapshotStore;

const DEFAULT_TENANT: &str = "default";

/// Audit entries kept in memory by the driver.
const AUDIT_CAPACITY: usize = 1_000;

#[derive(Debug, Deserialize)]
struct TurnRequest {
    conversation_id: Option<ConversationId>,
    tenant_id: Option<String>,
    #[serde(flatten)]
    input: TurnInput,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum TurnResponse {
    Outcome {
        #[serde(flatten)]
        outcome: Box<TurnOutcome>,
        restarted: bool,
    },
    Error {
        error: String,
        code: String,
    },
}

impl From<DomainError> for TurnResponse {
    fn from(err: DomainError) -> Self {
        TurnResponse::Error {
            error: err.message,
            code: err.code.to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    logging::init_tracing(&config.logging);

    let engine = config.build_engine()?;
    let store: Arc<dyn SnapshotStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemorySnapshotStore::new()),
        StorageBackend::File => {
            let path = config
                .storage
                .path
                .clone()
                .ok_or(ValidationError::MissingRequired("storage.path"))?;
            Arc::new(FileSnapshotStore::new(path))
        }
    };
    let handler = ProcessTurnHandler::new(
        engine,
        store,
        Arc::new(InMemoryAuditLog::with_capacity(AUDIT_CAPACITY)),
    );

    let session_conversation = ConversationId::new();
    tracing::info!(conversation_id = %session_conversation, "driver ready, reading turns from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<TurnRequest>(&line) {
            Ok(request) => handle(&handler, request, session_conversation).await,
            Err(e) => TurnResponse::Error {
                error: format!("malformed turn: {e}"),
                code: "INVALID_FORMAT".to_string(),
            },
        };

        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}

async fn handle(
    handler: &ProcessTurnHandler,
    request: TurnRequest,
    session_conversation: ConversationId,
) -> TurnResponse {
    let tenant = request.tenant_id.as_deref().unwrap_or(DEFAULT_TENANT);
    let tenant_id = match TenantId::new(tenant) {
        Ok(tenant_id) => tenant_id,
        Err(e) => return DomainError::from(e).into(),
    };

    let cmd = ProcessTurnCommand {
        conversation_id: request.conversation_id.unwrap_or(session_conversation),
        tenant_id,
        input: request.input,
    };
    match handler.handle(cmd).await {
        Ok(result) => TurnResponse::Outcome {
            outcome: Box::new(result.outcome),
            restarted: result.restarted,
        },
        Err(e) => e.into(),
    }
}
