//! Query embeddings.
//!
//! The pipeline embeds each question once before vector search. Providers
//! are constructed from `search.embedding` and injected into the orchestrator.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{OllamaEmbeddings, OpenAiEmbeddings, TrigramProvider};
