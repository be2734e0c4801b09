//! Structured retrieval: filter sets to product rows.

use super::{ProductRecord, ProductSession};
use crate::filters::{FieldMapping, FilterSet};
use floorwise_core::AppResult;
use std::sync::Arc;

/// Queries the product store with a filter set.
///
/// An empty filter set (or one with no mapped fields) yields no rows without
/// touching the store; there is no unfiltered scan.
#[derive(Debug, Clone)]
pub struct StructuredRetriever {
    mapping: Arc<FieldMapping>,
    limit: usize,
}

impl StructuredRetriever {
    pub fn new(mapping: Arc<FieldMapping>, limit: usize) -> Self {
        Self { mapping, limit }
    }

    pub fn retrieve(
        &self,
        session: &mut dyn ProductSession,
        filters: &FilterSet,
    ) -> AppResult<Vec<ProductRecord>> {
        let predicates = self.mapping.predicates(filters);
        if predicates.is_empty() {
            tracing::debug!(filters = filters.len(), "No mapped filters, skipping product query");
            return Ok(Vec::new());
        }

        let rows = session.query(&predicates, self.limit)?;
        tracing::debug!(
            predicates = predicates.len(),
            rows = rows.len(),
            "Structured retrieval complete"
        );
        Ok(rows)
    }
}
