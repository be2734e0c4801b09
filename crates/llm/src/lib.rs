//! Generation backend integration for Floorwise.
//!
//! A provider-agnostic `LlmClient` trait plus concrete clients:
//! - **Ollama**: local runtime (default)
//! - **OpenAI / Azure OpenAI**: chat completions
//!
//! # Example
//! ```no_run
//! use floorwise_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Which backings are available?", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{client_from_config, create_client};
pub use providers::{OllamaClient, OpenAiClient};
pub use types::{ClientOptions, ProviderType};
