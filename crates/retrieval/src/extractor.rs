//! Filter extraction: free text to a FilterSet via a grounded completion.

use crate::catalog::CatalogSnapshot;
use crate::filters::{FieldMapping, FilterField, FilterSet, FilterValue};
use floorwise_core::{AppError, AppResult};
use floorwise_llm::{LlmClient, LlmRequest};
use floorwise_prompt::{build_prompt, PromptDefinition};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Sampling for the extraction request. Overrides any prompt behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 100,
        }
    }
}

/// Asks the generation backend for product filters, grounded on the
/// partition's collection and style vocabularies.
pub struct FilterExtractor {
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    mapping: Arc<FieldMapping>,
    settings: ExtractionSettings,
}

impl FilterExtractor {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        mapping: Arc<FieldMapping>,
        settings: ExtractionSettings,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            prompt,
            mapping,
            settings,
        }
    }

    /// Extract filters for `query`.
    ///
    /// Unparseable completions are recovered as an empty set. Backend
    /// failures are returned.
    pub async fn extract(&self, query: &str, catalog: &CatalogSnapshot) -> AppResult<FilterSet> {
        let request = self.request(query, catalog)?;
        let response = self.llm.complete(&request).await?;
        tracing::debug!(raw = %response.content, "Filter extraction response");

        match parse_filters(&response.content, catalog.known_collections(), &self.mapping) {
            Ok(filters) => {
                tracing::debug!(filters = filters.len(), "Extracted filters");
                Ok(filters)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Filter extraction output unusable, continuing without filters");
                Ok(FilterSet::new())
            }
        }
    }

    fn request(&self, query: &str, catalog: &CatalogSnapshot) -> AppResult<LlmRequest> {
        let variables = json!({
            "query": query,
            "allowedFields": self.mapping.extractable_names(),
            "knownCollections": catalog.known_collections(),
            "knownStyles": catalog.known_styles(),
        });
        let variables = match variables {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let built = build_prompt(&self.prompt, &variables)?;
        let mut request = LlmRequest::new(built.user, &self.model)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        Ok(request)
    }
}

/// Parse a completion into a FilterSet.
///
/// Strips a surrounding code fence, reads a flat JSON object, moves a
/// `style_name` that names a known collection to `collection_name`, then
/// keeps only mapped vocabulary fields with non-empty values. The
/// classification field is never taken from the completion.
pub fn parse_filters(
    raw: &str,
    known_collections: &BTreeSet<String>,
    mapping: &FieldMapping,
) -> AppResult<FilterSet> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AppError::ExtractionParse(format!("{} in {:?}", e, body)))?;
    let Value::Object(mut object) = value else {
        return Err(AppError::ExtractionParse(format!(
            "expected a JSON object, got {:?}",
            body
        )));
    };

    let style_is_collection = object
        .get(FilterField::StyleName.as_str())
        .and_then(Value::as_str)
        .is_some_and(|style| known_collections.contains(style.trim()));
    if style_is_collection {
        if let Some(style) = object.remove(FilterField::StyleName.as_str()) {
            object.insert(FilterField::CollectionName.as_str().to_string(), style);
        }
    }

    let mut filters = FilterSet::new();
    for (key, value) in object {
        let Some(field) = FilterField::parse(&key) else {
            continue;
        };
        if field == FilterField::ProductClassification || !mapping.contains(field) {
            continue;
        }
        if let Some(value) = to_filter_value(value) {
            filters.insert(field, value);
        }
    }

    Ok(filters)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") on the opening line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    let rest = match rest.rfind("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    rest.trim()
}

fn to_filter_value(value: Value) -> Option<FilterValue> {
    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.into_iter().filter_map(scalar_text).collect();
            (!items.is_empty()).then_some(FilterValue::List(items))
        }
        other => scalar_text(other).map(FilterValue::Scalar),
    }
}

fn scalar_text(value: Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}
