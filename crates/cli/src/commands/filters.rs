//! Filters command handler.
//!
//! Runs filter extraction only and prints the resulting filter set.

use clap::Args;
use floorwise_core::{config::AppConfig, AppResult};
use floorwise_retrieval::{build_orchestrator, DomainPartition, Query};

/// Show the filters a question would be queried with
#[derive(Args, Debug)]
pub struct FiltersCommand {
    /// The question to extract filters from
    pub question: String,

    /// Domain partition (all, soft-surface, hard-surface)
    #[arg(long, default_value = "all")]
    pub partition: DomainPartition,
}

impl FiltersCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let orchestrator = build_orchestrator(config)?;
        let query = Query {
            text: self.question.clone(),
            partition: self.partition,
        };

        let filters = orchestrator.extract_filters(&query).await?;
        println!("{}", serde_json::to_string_pretty(&filters)?);
        Ok(())
    }
}
