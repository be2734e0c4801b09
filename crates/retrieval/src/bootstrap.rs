//! Builds the pipeline's concrete collaborators from configuration.

use crate::catalog::FileCatalog;
use crate::context::ContextAssembler;
use crate::embeddings::create_provider;
use crate::extractor::{ExtractionSettings, FilterExtractor};
use crate::filters::FieldMapping;
use crate::orchestrator::{AnswerSettings, ChatOrchestrator, Pipeline};
use crate::products::{SqliteProductStore, StructuredRetriever};
use crate::semantic::{create_search, SemanticRetriever};
use floorwise_core::config::AppConfig;
use floorwise_core::AppResult;
use floorwise_llm::client_from_config;
use floorwise_prompt::{load_prompt, ANSWER_PROMPT_ID, FILTER_PROMPT_ID};
use std::sync::Arc;

/// Construct every collaborator once and wire them into an orchestrator.
///
/// Fails on configuration problems: unknown filter fields, a product store
/// missing mapped columns, unknown providers or backends, invalid prompts.
pub fn build_orchestrator(config: &AppConfig) -> AppResult<ChatOrchestrator> {
    let retrieval = &config.retrieval;
    let mapping = Arc::new(FieldMapping::from_config(retrieval)?);

    let llm = client_from_config(config)?;
    let embedder = create_provider(config)?;
    let search = create_search(config)?;
    let store = SqliteProductStore::open(config.resolve_path(&config.database.path), &mapping)?;

    let filter_prompt = load_prompt(&config.workspace, FILTER_PROMPT_ID)?;
    let answer_prompt = load_prompt(&config.workspace, ANSWER_PROMPT_ID)?;

    tracing::info!(
        provider = llm.provider_name(),
        model = %config.model,
        embeddings = embedder.provider_name(),
        search = search.backend_name(),
        filter_fields = mapping.fields().count(),
        "Pipeline ready"
    );

    Ok(ChatOrchestrator::new(Pipeline {
        extractor: FilterExtractor::new(
            Arc::clone(&llm),
            config.model.clone(),
            filter_prompt,
            Arc::clone(&mapping),
            ExtractionSettings {
                temperature: retrieval.filter_temperature,
                max_tokens: retrieval.filter_max_tokens,
            },
        ),
        llm,
        embedder,
        semantic: SemanticRetriever::new(search, retrieval.top_k),
        structured: StructuredRetriever::new(mapping, retrieval.row_limit),
        store: Arc::new(store),
        catalog: Arc::new(FileCatalog::from_config(config)),
        assembler: ContextAssembler::new(retrieval.max_context_words),
        answer: AnswerSettings {
            model: config.model.clone(),
            prompt: answer_prompt,
            max_tokens: retrieval.answer_max_tokens,
        },
    }))
}
