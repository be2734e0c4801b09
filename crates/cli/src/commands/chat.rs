//! Chat command handler.
//!
//! Reads questions from stdin, one per line, and answers each in turn.
//! A failed answer is reported and the session continues.

use clap::Args;
use floorwise_core::{config::AppConfig, AppResult};
use floorwise_retrieval::{build_orchestrator, DomainPartition, Query};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Answer one question per stdin line
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Domain partition (all, soft-surface, hard-surface)
    #[arg(long, default_value = "all")]
    pub partition: DomainPartition,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(partition = %self.partition, "Starting chat session");

        let orchestrator = build_orchestrator(config)?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }

            let query = Query {
                text: text.to_string(),
                partition: self.partition,
            };
            match orchestrator.answer(&query).await {
                Ok(answer) => println!("{}\n", answer.text),
                Err(e) => {
                    tracing::error!(error = %e, "Answer failed");
                    eprintln!("Something went wrong while answering. Please try again.");
                }
            }
        }

        tracing::info!("Chat session ended");
        Ok(())
    }
}
