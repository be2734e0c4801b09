//! Generation client factory.
//!
//! Builds the configured `LlmClient` once at startup so it can be injected
//! into the pipeline. Nothing in the workspace keeps a global client.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::{ClientOptions, ProviderType};
use floorwise_core::config::AppConfig;
use floorwise_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client for a provider name.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// secret/endpoint is missing.
pub fn create_client(provider: &str, options: &ClientOptions) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::Ollama => {
            let base_url = options
                .endpoint
                .as_deref()
                .unwrap_or("http://localhost:11434");
            let client = match options.timeout {
                Some(timeout) => OllamaClient::with_timeout(base_url, timeout)?,
                None => OllamaClient::with_base_url(base_url),
            };
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI => {
            let api_key = options.api_key.as_deref().ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;

            match options.api_version.as_deref() {
                Some(version) => {
                    let endpoint = options.endpoint.as_deref().ok_or_else(|| {
                        AppError::Config("Azure OpenAI requires an endpoint".to_string())
                    })?;
                    Ok(Arc::new(OpenAiClient::azure(endpoint, api_key, version)))
                }
                None => Ok(Arc::new(OpenAiClient::new(
                    options.endpoint.as_deref(),
                    api_key,
                ))),
            }
        }
    }
}

/// Create the generation client described by the application config.
pub fn client_from_config(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let provider_config = config.get_provider_config(&config.provider);

    let timeout = match &provider_config {
        Some(floorwise_core::config::ProviderConfig::Ollama {
            timeout: Some(secs),
            ..
        }) => Some(Duration::from_secs(*secs)),
        _ => None,
    };

    let options = ClientOptions {
        endpoint: provider_config
            .as_ref()
            .and_then(|pc| pc.endpoint())
            .map(str::to_string),
        api_key: config.resolve_api_key(&config.provider),
        api_version: provider_config
            .as_ref()
            .and_then(|pc| pc.api_version())
            .map(str::to_string),
        timeout,
    };

    tracing::debug!(
        provider = %config.provider,
        endpoint = ?options.endpoint,
        "Creating generation client"
    );

    create_client(&config.provider, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", &ClientOptions::default()).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", &ClientOptions::default()) {
            Err(err) => assert!(err.to_string().contains("requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let options = ClientOptions {
            api_key: Some("key".to_string()),
            api_version: Some("2024-02-01".to_string()),
            ..Default::default()
        };
        assert!(create_client("openai", &options).is_err());
    }

    #[test]
    fn test_azure_client() {
        let options = ClientOptions {
            endpoint: Some("https://acme.openai.azure.com".to_string()),
            api_key: Some("key".to_string()),
            api_version: Some("2024-02-01".to_string()),
            timeout: None,
        };
        let client = create_client("openai", &options).unwrap();
        assert_eq!(client.provider_name(), "azure-openai");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", &ClientOptions::default()) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }

    #[test]
    fn test_client_from_default_config() {
        let client = client_from_config(&AppConfig::default()).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }
}
