//! Catalog snapshots: marketing metadata keyed by SKU.
//!
//! Snapshots are JSON arrays refreshed out-of-band. Each partition's file is
//! read at most once per process and then shared read-only between requests.

use crate::partition::DomainPartition;
use async_trait::async_trait;
use floorwise_core::config::{AppConfig, CatalogConfig};
use floorwise_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One product in a catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub sku: Option<String>,

    #[serde(rename = "collectionName", default)]
    pub collection_name: Option<String>,

    #[serde(rename = "styleName", default)]
    pub style_name: Option<String>,

    #[serde(rename = "producturl", default)]
    pub product_url: Option<String>,

    #[serde(rename = "thumb_image", default)]
    pub thumb_image: Option<String>,
}

/// An immutable, indexed catalog snapshot for one partition.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    by_sku: HashMap<String, CatalogEntry>,
    known_collections: BTreeSet<String>,
    known_styles: BTreeSet<String>,
}

impl CatalogSnapshot {
    /// Index entries by trimmed SKU (first occurrence wins) and collect the
    /// collection and style vocabularies.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut snapshot = Self::default();

        for entry in entries {
            if let Some(name) = non_empty(entry.collection_name.as_deref()) {
                snapshot.known_collections.insert(name.to_string());
            }
            if let Some(name) = non_empty(entry.style_name.as_deref()) {
                snapshot.known_styles.insert(name.to_string());
            }

            let Some(sku) = non_empty(entry.sku.as_deref()).map(str::to_string) else {
                continue;
            };
            snapshot.by_sku.entry(sku).or_insert(entry);
        }

        snapshot
    }

    pub fn from_json_str(contents: &str) -> AppResult<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(contents)
            .map_err(|e| AppError::Catalog(format!("Invalid catalog snapshot: {}", e)))?;
        Ok(Self::from_entries(entries))
    }

    /// SKU-keyed index; keys are trimmed, case preserved.
    pub fn by_sku(&self) -> &HashMap<String, CatalogEntry> {
        &self.by_sku
    }

    pub fn known_collections(&self) -> &BTreeSet<String> {
        &self.known_collections
    }

    pub fn known_styles(&self) -> &BTreeSet<String> {
        &self.known_styles
    }

    pub fn len(&self) -> usize {
        self.by_sku.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sku.is_empty()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Source of catalog snapshots per partition.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn snapshot(&self, partition: DomainPartition) -> AppResult<Arc<CatalogSnapshot>>;
}

/// Catalog snapshots read lazily from JSON files, once per partition.
pub struct FileCatalog {
    paths: HashMap<DomainPartition, PathBuf>,
    cells: HashMap<DomainPartition, OnceCell<Arc<CatalogSnapshot>>>,
}

impl FileCatalog {
    pub fn new(paths: HashMap<DomainPartition, PathBuf>) -> Self {
        let cells = DomainPartition::ALL
            .iter()
            .map(|partition| (*partition, OnceCell::new()))
            .collect();
        Self { paths, cells }
    }

    /// Resolve the configured snapshot paths against the workspace.
    pub fn from_config(config: &AppConfig) -> Self {
        let CatalogConfig {
            all,
            soft_surface,
            hard_surface,
        } = &config.catalog;

        let paths = [
            (DomainPartition::All, all),
            (DomainPartition::SoftSurface, soft_surface),
            (DomainPartition::HardSurface, hard_surface),
        ]
        .into_iter()
        .map(|(partition, path)| (partition, config.resolve_path(path)))
        .collect();

        Self::new(paths)
    }

    async fn load(path: &Path, partition: DomainPartition) -> AppResult<Arc<CatalogSnapshot>> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Catalog(format!(
                "Cache file for partition '{}' not readable at {:?}: {}",
                partition, path, e
            ))
        })?;

        let snapshot = CatalogSnapshot::from_json_str(&contents)?;
        tracing::info!(
            partition = %partition,
            products = snapshot.len(),
            collections = snapshot.known_collections().len(),
            styles = snapshot.known_styles().len(),
            "Loaded catalog snapshot"
        );

        Ok(Arc::new(snapshot))
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    async fn snapshot(&self, partition: DomainPartition) -> AppResult<Arc<CatalogSnapshot>> {
        let path = self.paths.get(&partition).ok_or_else(|| {
            AppError::Catalog(format!("No catalog snapshot configured for '{}'", partition))
        })?;
        let cell = self.cells.get(&partition).ok_or_else(|| {
            AppError::Catalog(format!("No catalog snapshot configured for '{}'", partition))
        })?;

        let snapshot = cell
            .get_or_try_init(|| Self::load(path, partition))
            .await?;
        Ok(Arc::clone(snapshot))
    }
}

/// A snapshot held in memory and served for every partition.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    snapshot: Arc<CatalogSnapshot>,
}

impl StaticCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn snapshot(&self, _partition: DomainPartition) -> AppResult<Arc<CatalogSnapshot>> {
        Ok(Arc::clone(&self.snapshot))
    }
}
