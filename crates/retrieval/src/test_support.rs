//! In-crate fakes for the pipeline's collaborators.

use crate::filters::Predicate;
use crate::partition::DomainPartition;
use crate::products::{ProductRecord, ProductSession, ProductStore};
use crate::semantic::{Chunk, VectorSearch};
use async_trait::async_trait;
use floorwise_core::{AppError, AppResult};
use floorwise_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Generation backend that replays scripted completions in order and
/// records every request. `Err` entries become `AppError::Llm`.
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::default(),
            }),
            Some(Err(message)) => Err(AppError::Llm(message)),
            None => Err(AppError::Llm("no scripted response left".to_string())),
        }
    }
}

/// Vector search returning the same chunks for every query.
pub struct FixedSearch {
    chunks: Vec<Chunk>,
    calls: AtomicUsize,
}

impl FixedSearch {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorSearch for FixedSearch {
    fn backend_name(&self) -> &str {
        "fixed"
    }

    async fn search(&self, _: DomainPartition, _: &[f32], k: usize) -> AppResult<Vec<Chunk>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chunks.iter().take(k).cloned().collect())
    }
}

#[derive(Default)]
struct SessionState {
    responses: VecDeque<Vec<ProductRecord>>,
    calls: Vec<(Vec<Predicate>, usize)>,
    failure: Option<String>,
}

/// Product session replaying scripted result sets (empty once exhausted)
/// and recording each query. Clones share state.
#[derive(Clone, Default)]
pub struct RecordingSession {
    state: Arc<Mutex<SessionState>>,
}

impl RecordingSession {
    pub fn returning(responses: Vec<Vec<ProductRecord>>) -> Self {
        let session = Self::default();
        session.state.lock().unwrap().responses = responses.into();
        session
    }

    pub fn failing(message: &str) -> Self {
        let session = Self::default();
        session.state.lock().unwrap().failure = Some(message.to_string());
        session
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn last_call(&self) -> Option<(Vec<Predicate>, usize)> {
        self.state.lock().unwrap().calls.last().cloned()
    }
}

impl ProductSession for RecordingSession {
    fn query(&mut self, predicates: &[Predicate], limit: usize) -> AppResult<Vec<ProductRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((predicates.to_vec(), limit));
        if let Some(message) = &state.failure {
            return Err(AppError::Store(message.clone()));
        }
        Ok(state.responses.pop_front().unwrap_or_default())
    }
}

/// Store handing out one shared recording session and counting how many
/// sessions were opened and released.
#[derive(Default)]
pub struct RecordingStore {
    session: RecordingSession,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub fn new(session: RecordingSession) -> Self {
        Self {
            session,
            ..Default::default()
        }
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl ProductStore for RecordingStore {
    fn open_session(&self) -> AppResult<Box<dyn ProductSession>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScopedSession {
            inner: self.session.clone(),
            released: Arc::clone(&self.released),
        }))
    }
}

struct ScopedSession {
    inner: RecordingSession,
    released: Arc<AtomicUsize>,
}

impl ProductSession for ScopedSession {
    fn query(&mut self, predicates: &[Predicate], limit: usize) -> AppResult<Vec<ProductRecord>> {
        self.inner.query(predicates, limit)
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
