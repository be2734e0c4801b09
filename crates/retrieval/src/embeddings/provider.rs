//! Embedding provider trait and factory.

use super::providers::{OllamaEmbeddings, OpenAiEmbeddings, TrigramProvider};
use floorwise_core::config::{AppConfig, ProviderConfig};
use floorwise_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "openai", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Search("No embedding returned".to_string()))
    }
}

/// Create the embedding provider named in `search.embedding`.
///
/// Endpoints and keys come from the matching `llm.providers` block, so a
/// single Ollama or OpenAI configuration serves both generation and
/// embeddings.
pub fn create_provider(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let settings = &config.search.embedding;

    match settings.provider.as_str() {
        "trigram" => Ok(Arc::new(TrigramProvider::new(settings.dimensions))),

        "ollama" => {
            let endpoint = config
                .get_provider_config("ollama")
                .and_then(|pc| pc.endpoint().map(str::to_string));
            let provider = OllamaEmbeddings::new(
                endpoint.as_deref(),
                &settings.model,
                settings.dimensions,
            )?;
            Ok(Arc::new(provider))
        }

        "openai" => {
            let provider_config = config.get_provider_config("openai");
            let api_key = config.resolve_api_key("openai").ok_or_else(|| {
                AppError::Config("OpenAI embeddings require an API key".to_string())
            })?;

            let provider = match provider_config {
                Some(ProviderConfig::OpenAI {
                    endpoint: Some(endpoint),
                    api_version: Some(version),
                    ..
                }) => OpenAiEmbeddings::azure(
                    &endpoint,
                    &api_key,
                    &version,
                    &settings.model,
                    settings.dimensions,
                )?,
                Some(ProviderConfig::OpenAI { endpoint, .. }) => OpenAiEmbeddings::new(
                    endpoint.as_deref(),
                    &api_key,
                    &settings.model,
                    settings.dimensions,
                )?,
                _ => OpenAiEmbeddings::new(None, &api_key, &settings.model, settings.dimensions)?,
            };
            Ok(Arc::new(provider))
        }

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama, openai",
            other
        ))),
    }
}
