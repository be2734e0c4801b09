//! Structured product data: records, the relational store and the
//! structured retriever.

pub mod sqlite;
pub mod structured;

pub use sqlite::SqliteProductStore;
pub use structured::StructuredRetriever;

use crate::filters::Predicate;
use floorwise_core::AppResult;
use serde::{Deserialize, Serialize};

/// Product attributes read from the relational store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub sku: String,
    pub style_name: Option<String>,
    pub collection_name: Option<String>,
    pub marketing_color_name: Option<String>,
    pub construction: Option<String>,
    pub backing_description: Option<String>,
    pub product_classification: Option<String>,
}

/// The relational product store.
pub trait ProductStore: Send + Sync {
    /// Acquire a session for one request. The session is released when the
    /// returned value is dropped.
    fn open_session(&self) -> AppResult<Box<dyn ProductSession>>;
}

/// A request-scoped store session. Calls block.
pub trait ProductSession: Send {
    /// Rows matching every predicate, at most `limit`, in a stable order.
    fn query(&mut self, predicates: &[Predicate], limit: usize) -> AppResult<Vec<ProductRecord>>;
}
