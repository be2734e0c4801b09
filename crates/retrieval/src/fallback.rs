//! Fallback inference for empty structured results.
//!
//! When the first structured query finds nothing, the brochure text usually
//! still names the collection it describes. The first line starting with
//! `Collection:` (any case) supplies a collection name for one more query.

use crate::filters::{FilterField, FilterSet, FilterValue};
use crate::products::{ProductRecord, ProductSession, StructuredRetriever};
use floorwise_core::AppResult;
use serde::Serialize;

const COLLECTION_PREFIX: &str = "collection:";

/// Rows found by structured retrieval, and how they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuredOutcome {
    pub records: Vec<ProductRecord>,
    /// The first query came back empty
    pub fallback_fired: bool,
    /// Collection name read from the brochure text, if any
    pub inferred_collection: Option<String>,
}

/// First line whose trimmed start begins with `Collection:` (ASCII case
/// insensitive) and has a non-empty remainder. Returns the remainder, trimmed.
pub fn infer_collection(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let line = line.trim_start();
        let prefix = line.get(..COLLECTION_PREFIX.len())?;
        if !prefix.eq_ignore_ascii_case(COLLECTION_PREFIX) {
            return None;
        }
        let remainder = line[COLLECTION_PREFIX.len()..].trim();
        (!remainder.is_empty()).then(|| remainder.to_string())
    })
}

/// The reduced filter set for the retry: the inferred collection plus the
/// original classification constraint, nothing else.
pub fn fallback_filters(collection: &str, original: &FilterSet) -> FilterSet {
    let mut filters = FilterSet::new();
    filters.insert(FilterField::CollectionName, FilterValue::scalar(collection));
    if let Some(classification) = original.get(FilterField::ProductClassification) {
        filters.insert(FilterField::ProductClassification, classification.clone());
    }
    filters
}

/// Run structured retrieval, falling back once on an empty result.
///
/// The fallback fires only when the first query returns no rows, and it
/// queries at most once more. A second empty result is final.
pub fn retrieve_with_fallback(
    retriever: &StructuredRetriever,
    session: &mut dyn ProductSession,
    filters: &FilterSet,
    unstructured_text: &str,
) -> AppResult<StructuredOutcome> {
    let records = retriever.retrieve(session, filters)?;
    if !records.is_empty() {
        return Ok(StructuredOutcome {
            records,
            ..Default::default()
        });
    }

    let Some(collection) = infer_collection(unstructured_text) else {
        tracing::info!("No structured results and no collection line to fall back on");
        return Ok(StructuredOutcome {
            fallback_fired: true,
            ..Default::default()
        });
    };

    tracing::info!(collection = %collection, "Retrying structured retrieval with inferred collection");
    let records = retriever.retrieve(session, &fallback_filters(&collection, filters))?;
    tracing::debug!(rows = records.len(), "Fallback retrieval complete");

    Ok(StructuredOutcome {
        records,
        fallback_fired: true,
        inferred_collection: Some(collection),
    })
}
