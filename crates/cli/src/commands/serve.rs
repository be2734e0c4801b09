//! Serve command handler.

use clap::Args;
use floorwise_core::{config::AppConfig, AppResult};
use floorwise_retrieval::build_orchestrator;

/// Serve the HTTP and WebSocket endpoints
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on (default: server.bind from config)
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);
        let orchestrator = build_orchestrator(config)?;
        floorwise_server::serve(bind, orchestrator).await
    }
}
