//! Ask command handler.
//!
//! Runs the full pipeline once and prints the answer.

use clap::Args;
use floorwise_core::{config::AppConfig, AppResult};
use floorwise_retrieval::{build_orchestrator, DomainPartition, Query};

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Domain partition (all, soft-surface, hard-surface)
    #[arg(long, default_value = "all")]
    pub partition: DomainPartition,

    /// Output the answer with retrieval diagnostics as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(partition = %self.partition, "Executing ask command");

        let orchestrator = build_orchestrator(config)?;
        let query = Query {
            text: self.question.clone(),
            partition: self.partition,
        };
        let answer = orchestrator.answer(&query).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            println!("{}", answer.text);
            tracing::debug!(
                products = answer.product_count,
                chunks = answer.chunk_count,
                fallback = answer.fallback_fired,
                truncated = answer.truncated,
                "Answer diagnostics"
            );
        }

        Ok(())
    }
}
