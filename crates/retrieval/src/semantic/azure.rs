//! Azure AI Search backend over the REST API.

use super::{Chunk, VectorSearch, EMBEDDING_FIELD};
use crate::partition::DomainPartition;
use async_trait::async_trait;
use floorwise_core::config::SearchConfig;
use floorwise_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    select: &'static str,
    top: usize,
    vector_queries: [VectorQuery<'a>; 1],
}

#[derive(Debug, Serialize)]
struct VectorQuery<'a> {
    kind: &'static str,
    vector: &'a [f32],
    fields: &'static str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    value: Vec<SearchDocument>,
}

#[derive(Debug, Deserialize)]
struct SearchDocument {
    id: String,
    #[serde(default)]
    content: String,
}

/// Vector queries against one Azure AI Search index per partition.
pub struct AzureSearch {
    endpoint: String,
    api_key: String,
    api_version: String,
    indexes: HashMap<String, String>,
    client: reqwest::Client,
}

impl AzureSearch {
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
        indexes: HashMap<String, String>,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: api_version.into(),
            indexes,
            client: reqwest::Client::new(),
        }
    }

    /// Build from the `search` config section. The key is read from the
    /// environment variable named by `apiKeyEnv` (default `AZURE_SEARCH_KEY`).
    pub fn from_config(config: &SearchConfig) -> AppResult<Self> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            AppError::Config("search.endpoint is required for the azure backend".to_string())
        })?;

        let key_env = config.api_key_env.as_deref().unwrap_or("AZURE_SEARCH_KEY");
        let api_key = std::env::var(key_env).map_err(|_| {
            AppError::Config(format!(
                "Search API key not found in environment variable: {}",
                key_env
            ))
        })?;

        Ok(Self::new(
            endpoint,
            api_key,
            config.api_version.clone(),
            config.indexes.clone(),
        ))
    }

    /// Index configured for a partition, or the partition's default name.
    pub fn index_for(&self, partition: DomainPartition) -> &str {
        self.indexes
            .get(partition.as_str())
            .or_else(|| self.indexes.get(partition.index_name()))
            .map(String::as_str)
            .unwrap_or_else(|| partition.index_name())
    }

    fn search_url(&self, index: &str) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, index, self.api_version
        )
    }
}

#[async_trait]
impl VectorSearch for AzureSearch {
    fn backend_name(&self) -> &str {
        "azure"
    }

    async fn search(
        &self,
        partition: DomainPartition,
        vector: &[f32],
        k: usize,
    ) -> AppResult<Vec<Chunk>> {
        let index = self.index_for(partition);
        let body = SearchRequest {
            select: "id,content",
            top: k,
            vector_queries: [VectorQuery {
                kind: "vector",
                vector,
                fields: EMBEDDING_FIELD,
                k,
            }],
        };

        tracing::debug!(index, k, "Sending vector query to Azure AI Search");

        let response = self
            .client
            .post(self.search_url(index))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Azure AI Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!(
                "Azure AI Search error ({}) on index '{}': {}",
                status, index, text
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse search response: {}", e)))?;

        Ok(parsed
            .value
            .into_iter()
            .map(|doc| Chunk {
                id: doc.id,
                text: doc.content,
            })
            .collect())
    }
}
