//! OpenAI-compatible chat completions provider.
//!
//! Speaks the `/v1/chat/completions` protocol. When an API version is set the
//! client targets Azure OpenAI instead, where the model name is the deployment
//! name and authentication uses the `api-key` header.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use floorwise_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<LlmUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI / Azure OpenAI chat client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    api_version: Option<String>,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client for api.openai.com or a compatible endpoint.
    pub fn new(endpoint: Option<&str>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: endpoint
                .unwrap_or(DEFAULT_OPENAI_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
            api_version: None,
            client: reqwest::Client::new(),
        }
    }

    /// Create a client for an Azure OpenAI resource.
    pub fn azure(endpoint: &str, api_key: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: Some(api_version.into()),
            client: reqwest::Client::new(),
        }
    }

    fn is_azure(&self) -> bool {
        self.api_version.is_some()
    }

    fn completions_url(&self, model: &str) -> String {
        match &self.api_version {
            Some(version) => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, model, version
            ),
            None => format!("{}/v1/chat/completions", self.base_url),
        }
    }

    fn to_chat_request<'a>(&self, request: &'a LlmRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            // Azure routes by deployment in the URL
            model: (!self.is_azure()).then_some(request.model.as_str()),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        if self.is_azure() {
            "azure-openai"
        } else {
            "openai"
        }
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, provider = self.provider_name(), "Sending chat completion request");

        let url = self.completions_url(&request.model);
        let body = self.to_chat_request(request);

        let builder = self.client.post(&url).json(&body);
        let builder = if self.is_azure() {
            builder.header("api-key", &self.api_key)
        } else {
            builder.bearer_auth(&self.api_key)
        };

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send chat completion request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Chat completion API error ({}): {}",
                status, error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse chat completion: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Llm("Chat completion returned no content".to_string()))?;

        Ok(LlmResponse {
            content,
            model: chat.model.unwrap_or_else(|| request.model.clone()),
            usage: chat.usage.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_url() {
        let client = OpenAiClient::new(None, "sk-test");
        assert_eq!(
            client.completions_url("gpt-4o"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_azure_url_uses_deployment() {
        let client = OpenAiClient::azure("https://acme.openai.azure.com/", "key", "2024-02-01");
        assert_eq!(
            client.completions_url("gpt4o-prod"),
            "https://acme.openai.azure.com/openai/deployments/gpt4o-prod/chat/completions?api-version=2024-02-01"
        );
        assert_eq!(client.provider_name(), "azure-openai");
    }

    #[test]
    fn test_chat_request_messages() {
        let client = OpenAiClient::new(None, "sk-test");
        let request = LlmRequest::new("Query: blue tiles", "gpt-4o")
            .with_system("Extract filters")
            .with_temperature(0.2);

        let body = serde_json::to_value(client.to_chat_request(&request)).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Query: blue tiles");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_azure_request_omits_model() {
        let client = OpenAiClient::azure("https://acme.openai.azure.com", "key", "2024-02-01");
        let request = LlmRequest::new("hi", "gpt4o-prod");

        let body = serde_json::to_value(client.to_chat_request(&request)).unwrap();
        assert!(body.get("model").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "model": "gpt-4o",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello"}}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 1, "total_tokens": 6}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hello"));
        assert_eq!(parsed.usage.unwrap().total_tokens, 6);
    }
}
