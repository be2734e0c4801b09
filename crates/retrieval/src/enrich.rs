//! Joins product rows with catalog marketing metadata.

use crate::catalog::CatalogEntry;
use crate::products::ProductRecord;
use serde::Serialize;
use std::collections::HashMap;

/// A product row with its catalog URL and thumbnail, when the SKU matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedProduct {
    #[serde(flatten)]
    pub record: ProductRecord,
    pub product_url: Option<String>,
    pub thumb_image: Option<String>,
}

/// Attach catalog metadata by exact SKU.
///
/// `catalog` is keyed by trimmed SKU. The row SKU is trimmed before lookup;
/// case is significant. Rows without a match keep all their fields and get
/// no URL or thumbnail.
pub fn enrich(
    records: Vec<ProductRecord>,
    catalog: &HashMap<String, CatalogEntry>,
) -> Vec<EnrichedProduct> {
    records
        .into_iter()
        .map(|record| {
            let entry = catalog.get(record.sku.trim());
            EnrichedProduct {
                product_url: entry.and_then(|e| present(e.product_url.as_deref())),
                thumb_image: entry.and_then(|e| present(e.thumb_image.as_deref())),
                record,
            }
        })
        .collect()
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
