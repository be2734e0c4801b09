//! A pipeline wired to in-memory collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use floorwise_core::{AppError, AppResult};
use floorwise_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use floorwise_prompt::{load_builtin, ANSWER_PROMPT_ID, FILTER_PROMPT_ID};
use floorwise_retrieval::embeddings::TrigramProvider;
use floorwise_retrieval::{
    AnswerSettings, CatalogEntry, CatalogSnapshot, ChatOrchestrator, Chunk, ContextAssembler,
    DomainPartition, ExtractionSettings, FieldMapping, FilterExtractor, Pipeline, Predicate,
    ProductRecord, ProductSession, ProductStore, SemanticRetriever, StaticCatalog,
    StructuredRetriever, VectorSearch,
};
use floorwise_server::AppState;

pub const REPLY: &str = "Aria from the Element collection ships with CushionBac.";

/// Answers filter prompts with a fixed filter object and everything else
/// with `REPLY`, unless told to fail.
pub struct CannedLlm {
    fail: bool,
    calls: AtomicUsize,
}

impl CannedLlm {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for CannedLlm {
    fn provider_name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Llm("upstream timed out after 30s".to_string()));
        }
        let content = if request.prompt.starts_with("Query:") {
            r#"{"collection_name": "Element"}"#
        } else {
            REPLY
        };
        Ok(LlmResponse {
            content: content.to_string(),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

struct BrochureSearch;

#[async_trait]
impl VectorSearch for BrochureSearch {
    fn backend_name(&self) -> &str {
        "brochure"
    }

    async fn search(&self, _: DomainPartition, _: &[f32], _: usize) -> AppResult<Vec<Chunk>> {
        Ok(vec![Chunk::new(
            "c1",
            "Collection: Element\nAria is a tufted broadloom with CushionBac.",
        )])
    }
}

struct OneProductStore;

impl ProductStore for OneProductStore {
    fn open_session(&self) -> AppResult<Box<dyn ProductSession>> {
        Ok(Box::new(OneProductSession))
    }
}

struct OneProductSession;

impl ProductSession for OneProductSession {
    fn query(&mut self, _: &[Predicate], _: usize) -> AppResult<Vec<ProductRecord>> {
        Ok(vec![ProductRecord {
            sku: "S1".to_string(),
            style_name: Some("Aria".to_string()),
            collection_name: Some("Element".to_string()),
            backing_description: Some("CushionBac".to_string()),
            product_classification: Some("SoftSurface".to_string()),
            ..Default::default()
        }])
    }
}

pub struct Fixture {
    pub state: Arc<AppState>,
    pub llm: Arc<CannedLlm>,
}

pub fn fixture() -> Fixture {
    build(false)
}

pub fn failing_fixture() -> Fixture {
    build(true)
}

fn build(fail: bool) -> Fixture {
    let llm = Arc::new(CannedLlm {
        fail,
        calls: AtomicUsize::new(0),
    });
    let mapping = Arc::new(FieldMapping::full());
    let catalog = CatalogSnapshot::from_entries(vec![CatalogEntry {
        sku: Some("S1".to_string()),
        collection_name: Some("Element".to_string()),
        style_name: Some("Aria".to_string()),
        product_url: Some("https://example.test/aria".to_string()),
        thumb_image: None,
    }]);

    let orchestrator = ChatOrchestrator::new(Pipeline {
        llm: llm.clone(),
        embedder: Arc::new(TrigramProvider::new(64)),
        semantic: SemanticRetriever::new(Arc::new(BrochureSearch), 5),
        extractor: FilterExtractor::new(
            llm.clone(),
            "test-model",
            load_builtin(FILTER_PROMPT_ID).expect("builtin filter prompt"),
            Arc::clone(&mapping),
            ExtractionSettings::default(),
        ),
        structured: StructuredRetriever::new(mapping, 100),
        store: Arc::new(OneProductStore),
        catalog: Arc::new(StaticCatalog::new(catalog)),
        assembler: ContextAssembler::new(1500),
        answer: AnswerSettings {
            model: "test-model".to_string(),
            prompt: load_builtin(ANSWER_PROMPT_ID).expect("builtin answer prompt"),
            max_tokens: 1024,
        },
    });

    Fixture {
        state: Arc::new(AppState::new(orchestrator)),
        llm,
    }
}
