use floorwise_retrieval::ChatOrchestrator;

/// Shared by every request and socket.
pub struct AppState {
    pub orchestrator: ChatOrchestrator,
}

impl AppState {
    pub fn new(orchestrator: ChatOrchestrator) -> Self {
        Self { orchestrator }
    }
}
