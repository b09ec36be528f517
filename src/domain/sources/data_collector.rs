//! Merges newly extracted fields into collected data.

use crate::domain::conditions::EvaluationContext;
use crate::domain::decision::{Priority, Proposal};

use super::source::{KnowledgeSource, SourceError};

pub const DATA_COLLECTOR_SOURCE: &str = "data_collector";

pub struct DataCollector;

impl KnowledgeSource for DataCollector {
    fn id(&self) -> &str {
        DATA_COLLECTOR_SOURCE
    }

    fn contribute(&self, ctx: &EvaluationContext<'_>) -> Result<Vec<Proposal>, SourceError> {
        let changes = ctx.collected_data.changes_from(ctx.extracted_data);
        if changes.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![
            Proposal::data_update(changes, Priority::Low).with_reason("data_extracted"),
        ])
    }
}
