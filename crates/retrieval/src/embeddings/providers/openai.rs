//! OpenAI / Azure OpenAI embeddings provider.

use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use floorwise_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Embeddings over `/v1/embeddings`, or an Azure deployment when an API
/// version is set.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddings {
    base_url: String,
    api_key: String,
    api_version: Option<String>,
    model: String,
    dimensions: usize,
    client: reqwest::Client,
}

impl OpenAiEmbeddings {
    pub fn new(
        endpoint: Option<&str>,
        api_key: &str,
        model: &str,
        dimensions: usize,
    ) -> AppResult<Self> {
        Self::build(endpoint.unwrap_or(DEFAULT_OPENAI_URL), api_key, None, model, dimensions)
    }

    /// `model` is the Azure deployment name.
    pub fn azure(
        endpoint: &str,
        api_key: &str,
        api_version: &str,
        model: &str,
        dimensions: usize,
    ) -> AppResult<Self> {
        Self::build(endpoint, api_key, Some(api_version), model, dimensions)
    }

    fn build(
        endpoint: &str,
        api_key: &str,
        api_version: Option<&str>,
        model: &str,
        dimensions: usize,
    ) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Config("Embeddings API key is empty".to_string()));
        }

        Ok(Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_version: api_version.map(str::to_string),
            model: model.to_string(),
            dimensions,
            client: reqwest::Client::new(),
        })
    }

    fn embeddings_url(&self) -> String {
        match &self.api_version {
            Some(version) => format!(
                "{}/openai/deployments/{}/embeddings?api-version={}",
                self.base_url, self.model, version
            ),
            None => format!("{}/v1/embeddings", self.base_url),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn provider_name(&self) -> &str {
        if self.api_version.is_some() {
            "azure-openai"
        } else {
            "openai"
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingsRequest {
            model: self.api_version.is_none().then_some(self.model.as_str()),
            input: texts,
        };

        let builder = self.client.post(self.embeddings_url()).json(&body);
        let builder = if self.api_version.is_some() {
            builder.header("api-key", &self.api_key)
        } else {
            builder.bearer_auth(&self.api_key)
        };

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Embeddings request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!(
                "Embeddings API error ({}): {}",
                status, text
            )));
        }

        let mut parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse embeddings response: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(AppError::Search(format!(
                "Embeddings API returned {} vectors for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}
