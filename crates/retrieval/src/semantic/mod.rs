//! Semantic retrieval over ingested brochure fragments.

pub mod azure;
pub mod sqlite;

pub use azure::AzureSearch;
pub use sqlite::SqliteChunkIndex;

use crate::partition::DomainPartition;
use async_trait::async_trait;
use floorwise_core::config::AppConfig;
use floorwise_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Vector field every search request is restricted to.
pub const EMBEDDING_FIELD: &str = "embedding";

/// A fragment of ingested document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source identifier assigned at ingestion
    pub id: String,
    pub text: String,
}

impl Chunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Vector-search backend. Ranking is the backend's business; callers get
/// back at most `k` chunks in backend order.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    fn backend_name(&self) -> &str;

    async fn search(
        &self,
        partition: DomainPartition,
        vector: &[f32],
        k: usize,
    ) -> AppResult<Vec<Chunk>>;
}

/// Requests the `top_k` nearest chunks for a query vector. Every returned
/// chunk is kept; there is no score threshold and no retry.
#[derive(Clone)]
pub struct SemanticRetriever {
    search: Arc<dyn VectorSearch>,
    top_k: usize,
}

impl SemanticRetriever {
    pub fn new(search: Arc<dyn VectorSearch>, top_k: usize) -> Self {
        Self { search, top_k }
    }

    pub async fn retrieve(
        &self,
        partition: DomainPartition,
        vector: &[f32],
    ) -> AppResult<Vec<Chunk>> {
        let chunks = self.search.search(partition, vector, self.top_k).await?;

        tracing::debug!(
            backend = self.search.backend_name(),
            requested = self.top_k,
            returned = chunks.len(),
            "Semantic retrieval complete"
        );

        Ok(chunks)
    }
}

/// Construct the search backend named in `search.backend`.
pub fn create_search(config: &AppConfig) -> AppResult<Arc<dyn VectorSearch>> {
    match config.search.backend.as_str() {
        "sqlite" => Ok(Arc::new(SqliteChunkIndex::new(
            config.resolve_path(&config.search.index_path),
        ))),
        "azure" => Ok(Arc::new(AzureSearch::from_config(&config.search)?)),
        other => Err(AppError::Config(format!(
            "Unknown search backend: {}. Supported: sqlite, azure",
            other
        ))),
    }
}
