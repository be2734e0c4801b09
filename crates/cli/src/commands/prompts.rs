//! Prompts command handler.
//!
//! Lists the prompt definitions available to this workspace.

use clap::Args;
use floorwise_core::{config::AppConfig, AppResult};
use floorwise_prompt::list_prompts;

/// List prompt definitions (built-in and workspace overrides)
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let ids = list_prompts(&config.workspace)?;
        tracing::debug!(count = ids.len(), "Listed prompts");

        if self.json {
            println!("{}", serde_json::to_string_pretty(&ids)?);
        } else {
            let overrides = config.floorwise_dir().join("prompts");
            for id in ids {
                let marker = if overrides.join(format!("{}.yml", id)).is_file() {
                    " (workspace)"
                } else {
                    ""
                };
                println!("{}{}", id, marker);
            }
        }

        Ok(())
    }
}
