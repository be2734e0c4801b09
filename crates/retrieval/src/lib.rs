//! Hybrid retrieval and context assembly for flooring product questions.
//!
//! A question runs through:
//! 1. query embedding and semantic retrieval of brochure chunks
//! 2. filter extraction grounded on the partition's catalog vocabulary
//! 3. structured retrieval from the product store, with a one-shot
//!    fallback on the brochure's `Collection:` line when nothing matches
//! 4. catalog enrichment by SKU
//! 5. context assembly under a word budget, then the answer completion
//!
//! # Example
//! ```no_run
//! use floorwise_core::config::AppConfig;
//! use floorwise_retrieval::{build_orchestrator, Query};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let orchestrator = build_orchestrator(&config)?;
//! let answer = orchestrator
//!     .answer(&Query::new("Which Element styles have CushionBac?", "soft-surface")?)
//!     .await?;
//! println!("{}", answer.text);
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod catalog;
pub mod context;
pub mod embeddings;
pub mod enrich;
pub mod extractor;
pub mod fallback;
pub mod filters;
pub mod orchestrator;
pub mod partition;
pub mod products;
pub mod semantic;

#[cfg(test)]
pub(crate) mod test_support;

pub use bootstrap::build_orchestrator;
pub use catalog::{CatalogEntry, CatalogSnapshot, CatalogSource, FileCatalog, StaticCatalog};
pub use context::{ContextAssembler, ContextBundle};
pub use embeddings::EmbeddingProvider;
pub use enrich::{enrich, EnrichedProduct};
pub use extractor::{parse_filters, ExtractionSettings, FilterExtractor};
pub use fallback::{infer_collection, retrieve_with_fallback, StructuredOutcome};
pub use filters::{FieldMapping, FilterField, FilterSet, FilterValue, Predicate, PredicateKind};
pub use orchestrator::{Answer, AnswerSettings, ChatOrchestrator, Pipeline, Query};
pub use partition::DomainPartition;
pub use products::{ProductRecord, ProductSession, ProductStore, SqliteProductStore, StructuredRetriever};
pub use semantic::{Chunk, SemanticRetriever, VectorSearch};
