//! The chat pipeline: one stateless run per question.

use crate::catalog::CatalogSource;
use crate::context::ContextAssembler;
use crate::embeddings::EmbeddingProvider;
use crate::enrich::enrich;
use crate::extractor::FilterExtractor;
use crate::fallback::{retrieve_with_fallback, StructuredOutcome};
use crate::filters::FilterSet;
use crate::partition::DomainPartition;
use crate::products::{ProductStore, StructuredRetriever};
use crate::semantic::SemanticRetriever;
use floorwise_core::{AppError, AppResult};
use floorwise_llm::{LlmClient, LlmRequest};
use floorwise_prompt::{build_prompt, PromptDefinition};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::Instrument;

/// A question scoped to a domain partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub partition: DomainPartition,
}

impl Query {
    /// Build a query, rejecting unknown partitions before any work happens.
    pub fn new(text: impl Into<String>, partition: &str) -> AppResult<Self> {
        Ok(Self {
            text: text.into(),
            partition: DomainPartition::parse(partition)?,
        })
    }
}

/// The answer text plus diagnostics about how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Markdown answer
    pub text: String,
    pub partition: DomainPartition,
    /// Filters used for the first structured query
    pub filters: FilterSet,
    pub fallback_fired: bool,
    pub inferred_collection: Option<String>,
    pub product_count: usize,
    pub chunk_count: usize,
    pub context_words: usize,
    pub truncated: bool,
}

/// Settings for the final answer call.
#[derive(Debug, Clone)]
pub struct AnswerSettings {
    pub model: String,
    pub prompt: PromptDefinition,
    /// Overrides any prompt `maxTokens`
    pub max_tokens: u32,
}

/// Every collaborator the pipeline needs, constructed by the caller.
pub struct Pipeline {
    pub llm: Arc<dyn LlmClient>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub semantic: SemanticRetriever,
    pub extractor: FilterExtractor,
    pub structured: StructuredRetriever,
    pub store: Arc<dyn ProductStore>,
    pub catalog: Arc<dyn CatalogSource>,
    pub assembler: ContextAssembler,
    pub answer: AnswerSettings,
}

/// Sequences retrieval, assembly and generation for each question.
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct ChatOrchestrator {
    pipeline: Pipeline,
}

impl ChatOrchestrator {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Run the pipeline for one question.
    ///
    /// Empty structured results degrade the answer but do not fail it;
    /// catalog and upstream service failures abort the run.
    pub async fn answer(&self, query: &Query) -> AppResult<Answer> {
        let span = tracing::info_span!("pipeline", partition = %query.partition);
        self.run(query).instrument(span).await
    }

    /// The filters a question would be queried with, classification
    /// included. Runs extraction only.
    pub async fn extract_filters(&self, query: &Query) -> AppResult<FilterSet> {
        let catalog = self.pipeline.catalog.snapshot(query.partition).await?;
        Ok(self
            .pipeline
            .extractor
            .extract(&query.text, &catalog)
            .await?
            .with_classification(query.partition.classifications()))
    }

    async fn run(&self, query: &Query) -> AppResult<Answer> {
        let p = &self.pipeline;
        let partition = query.partition;

        let vector = p.embedder.embed(&query.text).await?;
        let chunks = p.semantic.retrieve(partition, &vector).await?;

        let catalog = p.catalog.snapshot(partition).await?;
        let filters = p
            .extractor
            .extract(&query.text, &catalog)
            .await?
            .with_classification(partition.classifications());
        tracing::info!(
            filters = %serde_json::to_string(&filters).unwrap_or_default(),
            "Structured filters"
        );

        let brochure = chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let outcome = self.structured(filters.clone(), brochure).await?;

        let products = enrich(outcome.records, catalog.by_sku());
        let context = p.assembler.assemble(&chunks, &products);
        tracing::debug!(
            chunks = chunks.len(),
            products = products.len(),
            words = context.word_count,
            "Context assembled"
        );

        let text = self.generate(&query.text, &context.text).await?;

        Ok(Answer {
            text,
            partition,
            filters,
            fallback_fired: outcome.fallback_fired,
            inferred_collection: outcome.inferred_collection,
            product_count: products.len(),
            chunk_count: chunks.len(),
            context_words: context.word_count,
            truncated: context.truncated,
        })
    }

    /// Structured retrieval and fallback share one store session on a
    /// blocking thread; the session is dropped when the closure returns.
    async fn structured(&self, filters: FilterSet, brochure: String) -> AppResult<StructuredOutcome> {
        let store = Arc::clone(&self.pipeline.store);
        let retriever = self.pipeline.structured.clone();

        tokio::task::spawn_blocking(move || {
            let mut session = store.open_session()?;
            retrieve_with_fallback(&retriever, session.as_mut(), &filters, &brochure)
        })
        .await
        .map_err(|e| AppError::Store(format!("Product query task failed: {}", e)))?
    }

    async fn generate(&self, question: &str, context: &str) -> AppResult<String> {
        let settings = &self.pipeline.answer;

        let mut variables = Map::new();
        variables.insert("context".to_string(), Value::String(context.to_string()));
        variables.insert("question".to_string(), Value::String(question.to_string()));

        let built = build_prompt(&settings.prompt, &variables)?;
        let mut request = LlmRequest::new(built.user, &settings.model)
            .with_max_tokens(settings.max_tokens);
        if let Some(temperature) = built.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.pipeline.llm.complete(&request).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, CatalogSnapshot, StaticCatalog};
    use crate::embeddings::TrigramProvider;
    use crate::extractor::ExtractionSettings;
    use crate::filters::{FieldMapping, FilterField, FilterValue, PredicateKind};
    use crate::products::ProductRecord;
    use crate::semantic::Chunk;
    use crate::test_support::{FixedSearch, RecordingSession, RecordingStore, ScriptedLlm};
    use floorwise_prompt::{load_builtin, ANSWER_PROMPT_ID, FILTER_PROMPT_ID};

    struct Harness {
        llm: Arc<ScriptedLlm>,
        search: Arc<FixedSearch>,
        store: Arc<RecordingStore>,
        orchestrator: ChatOrchestrator,
    }

    fn harness(
        llm_responses: Vec<Result<String, String>>,
        chunks: Vec<Chunk>,
        session: RecordingSession,
        max_words: usize,
    ) -> Harness {
        let llm = Arc::new(ScriptedLlm::new(llm_responses));
        let search = Arc::new(FixedSearch::new(chunks));
        let store = Arc::new(RecordingStore::new(session));
        let mapping = Arc::new(FieldMapping::full());

        let catalog = CatalogSnapshot::from_entries(vec![CatalogEntry {
            sku: Some("S1 ".to_string()),
            collection_name: Some("Element".to_string()),
            style_name: Some("Aria".to_string()),
            product_url: Some("https://example.com/s1".to_string()),
            thumb_image: Some("https://example.com/s1.jpg".to_string()),
        }]);

        let pipeline = Pipeline {
            llm: llm.clone(),
            embedder: Arc::new(TrigramProvider::new(64)),
            semantic: SemanticRetriever::new(search.clone(), 10),
            extractor: FilterExtractor::new(
                llm.clone(),
                "test-model",
                load_builtin(FILTER_PROMPT_ID).unwrap(),
                Arc::clone(&mapping),
                ExtractionSettings::default(),
            ),
            structured: StructuredRetriever::new(mapping, 10),
            store: store.clone(),
            catalog: Arc::new(StaticCatalog::new(catalog)),
            assembler: ContextAssembler::new(max_words),
            answer: AnswerSettings {
                model: "test-model".to_string(),
                prompt: load_builtin(ANSWER_PROMPT_ID).unwrap(),
                max_tokens: 512,
            },
        };

        Harness {
            llm,
            search,
            store,
            orchestrator: ChatOrchestrator::new(pipeline),
        }
    }

    fn element_row() -> ProductRecord {
        ProductRecord {
            sku: "S1".to_string(),
            style_name: Some("Aria".to_string()),
            collection_name: Some("Element".to_string()),
            marketing_color_name: Some("Harbor Blue".to_string()),
            construction: Some("Tufted".to_string()),
            backing_description: Some("CushionBac".to_string()),
            product_classification: Some("SoftSurface".to_string()),
        }
    }

    fn soft_query(text: &str) -> Query {
        Query::new(text, "soft-surface").unwrap()
    }

    #[tokio::test]
    async fn test_collection_query_scoped_to_partition() {
        let h = harness(
            vec![
                Ok("{\"collection_name\": \"Element\"}".to_string()),
                Ok("### Element\nAria is available in Harbor Blue.".to_string()),
            ],
            vec![Chunk::new("c1", "Element is a loop pile carpet tile.")],
            RecordingSession::returning(vec![vec![element_row()]]),
            1500,
        );

        let answer = h
            .orchestrator
            .answer(&soft_query("show me blue tiles in the Element collection"))
            .await
            .unwrap();

        assert_eq!(answer.text, "### Element\nAria is available in Harbor Blue.");
        assert_eq!(
            answer.filters.get(FilterField::CollectionName),
            Some(&FilterValue::scalar("Element"))
        );
        assert_eq!(
            answer.filters.get(FilterField::ProductClassification),
            Some(&FilterValue::List(vec!["SoftSurface".to_string()]))
        );
        assert!(!answer.fallback_fired);
        assert_eq!(answer.product_count, 1);
        assert_eq!(answer.chunk_count, 1);

        let (predicates, limit) = h.store.session().last_call().unwrap();
        assert_eq!(limit, 10);
        assert_eq!(
            predicates[0].kind,
            PredicateKind::Contains("Element".to_string())
        );
        assert_eq!(
            predicates[1].kind,
            PredicateKind::Membership(vec!["SoftSurface".to_string()])
        );

        let requests = h.llm.requests();
        assert_eq!(requests.len(), 2);
        let answer_request = &requests[1];
        assert_eq!(answer_request.max_tokens, Some(512));
        assert!(answer_request
            .prompt
            .starts_with("Use this context: == BROCHURE CONTEXT ==\nElement is a loop pile"));
        assert!(answer_request.prompt.contains("**URL**: https://example.com/s1  \n"));
        assert!(answer_request
            .prompt
            .ends_with("\n\nQuestion: show me blue tiles in the Element collection"));
        assert!(answer_request.system.as_deref().unwrap().contains("flooring advisor"));
    }

    #[tokio::test]
    async fn test_classification_cannot_be_widened_by_extraction() {
        let h = harness(
            vec![
                Ok("{\"product_classification\": [\"HardSurface\", \"SoftSurface\"]}".to_string()),
                Ok("answer".to_string()),
            ],
            vec![],
            RecordingSession::returning(vec![vec![element_row()]]),
            1500,
        );

        let answer = h.orchestrator.answer(&soft_query("anything")).await.unwrap();
        assert_eq!(
            answer.filters.get(FilterField::ProductClassification),
            Some(&FilterValue::List(vec!["SoftSurface".to_string()]))
        );
        assert_eq!(answer.filters.len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_from_brochure_collection_line() {
        let h = harness(
            vec![Ok("not json".to_string()), Ok("answer".to_string())],
            vec![Chunk::new("c1", "Product overview\nCollection: Horizon\nDurable.")],
            RecordingSession::returning(vec![vec![]]),
            1500,
        );

        let answer = h.orchestrator.answer(&soft_query("what's durable?")).await.unwrap();

        assert!(answer.fallback_fired);
        assert_eq!(answer.inferred_collection.as_deref(), Some("Horizon"));
        assert_eq!(answer.product_count, 0);
        assert_eq!(h.store.session().calls(), 2);
        assert_eq!(h.store.opened(), 1);
        assert_eq!(h.store.released(), 1);
        assert_eq!(answer.text, "answer");
    }

    #[tokio::test]
    async fn test_context_truncated_to_budget() {
        let long = "carpet ".repeat(3000);
        let h = harness(
            vec![Ok("{}".to_string()), Ok("answer".to_string())],
            vec![Chunk::new("c1", long)],
            RecordingSession::returning(vec![vec![element_row()]]),
            50,
        );

        let answer = h.orchestrator.answer(&soft_query("carpet")).await.unwrap();
        assert!(answer.truncated);
        assert_eq!(answer.context_words, 50);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_and_releases_session() {
        let h = harness(
            vec![Ok("{}".to_string()), Ok("answer".to_string())],
            vec![],
            RecordingSession::failing("database is locked"),
            1500,
        );

        let result = h.orchestrator.answer(&soft_query("anything")).await;

        assert!(matches!(result, Err(AppError::Store(_))));
        assert_eq!(h.store.opened(), 1);
        assert_eq!(h.store.released(), 1);
        // no answer call after the abort
        assert_eq!(h.llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_aborts() {
        let h = harness(
            vec![Ok("{}".to_string()), Err("rate limited".to_string())],
            vec![],
            RecordingSession::returning(vec![]),
            1500,
        );

        let result = h.orchestrator.answer(&soft_query("anything")).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[tokio::test]
    async fn test_extract_filters_only() {
        let h = harness(
            vec![Ok("{\"style_name\": \"Element\"}".to_string())],
            vec![],
            RecordingSession::default(),
            1500,
        );

        let filters = h
            .orchestrator
            .extract_filters(&Query::new("Element", "all").unwrap())
            .await
            .unwrap();

        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "collection_name": "Element",
                "product_classification": ["SoftSurface", "HardSurface"],
            })
        );
        assert_eq!(h.search.calls(), 0);
        assert_eq!(h.store.opened(), 0);
    }

    #[test]
    fn test_invalid_partition_rejected_up_front() {
        assert!(matches!(
            Query::new("hello", "vinyl"),
            Err(AppError::InvalidPartition(_))
        ));
    }

    #[tokio::test]
    async fn test_each_run_is_independent() {
        let h = harness(
            vec![
                Ok("{\"collection_name\": \"Element\"}".to_string()),
                Ok("first".to_string()),
                Ok("{}".to_string()),
                Ok("second".to_string()),
            ],
            vec![],
            RecordingSession::returning(vec![vec![element_row()], vec![element_row()]]),
            1500,
        );

        let first = h.orchestrator.answer(&soft_query("Element")).await.unwrap();
        let second = h.orchestrator.answer(&soft_query("anything")).await.unwrap();

        assert_eq!(first.text, "first");
        assert_eq!(second.text, "second");
        assert!(!second.filters.contains(FilterField::CollectionName));
        assert_eq!(h.search.calls(), 2);
        assert_eq!(h.store.released(), 2);
    }
}
