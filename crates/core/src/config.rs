//! Configuration management for Floorwise.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults
//! - Config files (.floorwise/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Configuration is loaded once at process start. Every collaborator of the
//! retrieval pipeline (clients, stores, snapshots) is built from it explicitly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .floorwise/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Default LLM provider ("ollama" or "openai")
    pub provider: String,

    /// Default model identifier (deployment name for Azure OpenAI)
    pub model: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Retrieval pipeline budgets and knobs
    pub retrieval: RetrievalConfig,

    /// Catalog snapshot locations
    pub catalog: CatalogConfig,

    /// Relational product store
    pub database: DatabaseConfig,

    /// Vector search backend and query embeddings
    pub search: SearchConfig,

    /// HTTP/WebSocket server
    pub server: ServerConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(rename = "activeEmbeddingProvider")]
    pub active_embedding_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    /// OpenAI-compatible endpoint. Setting `apiVersion` switches to Azure
    /// OpenAI deployment URLs.
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        endpoint: Option<String>,
        #[serde(rename = "apiVersion")]
        api_version: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Endpoint override for this provider, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }

    /// Azure OpenAI API version, if configured.
    pub fn api_version(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI { api_version, .. } => api_version.as_deref(),
            ProviderConfig::Ollama { .. } => None,
        }
    }

    /// Embedding model configured next to the completion model.
    pub fn embedding_model(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI {
                embedding_model, ..
            }
            | ProviderConfig::Ollama {
                embedding_model, ..
            } => embedding_model.as_deref(),
        }
    }
}

/// Retrieval pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Number of chunks requested from vector search
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Maximum product rows per structured query
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,

    /// Word budget for the assembled context
    #[serde(default = "default_max_context_words")]
    pub max_context_words: usize,

    /// Sampling temperature for filter extraction
    #[serde(default = "default_filter_temperature")]
    pub filter_temperature: f32,

    /// Output bound for filter extraction
    #[serde(default = "default_filter_max_tokens")]
    pub filter_max_tokens: u32,

    /// Output bound for the final answer
    #[serde(default = "default_answer_max_tokens")]
    pub answer_max_tokens: u32,

    /// Restrict the filter vocabulary to these field names.
    /// Names are validated against the vocabulary at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_fields: Option<Vec<String>>,
}

fn default_top_k() -> usize {
    10
}

fn default_row_limit() -> usize {
    10
}

fn default_max_context_words() -> usize {
    1500
}

fn default_filter_temperature() -> f32 {
    0.2
}

fn default_filter_max_tokens() -> u32 {
    100
}

fn default_answer_max_tokens() -> u32 {
    1024
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            row_limit: default_row_limit(),
            max_context_words: default_max_context_words(),
            filter_temperature: default_filter_temperature(),
            filter_max_tokens: default_filter_max_tokens(),
            answer_max_tokens: default_answer_max_tokens(),
            filter_fields: None,
        }
    }
}

/// Catalog snapshot files, one per domain partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    #[serde(default = "default_all_catalog")]
    pub all: PathBuf,

    #[serde(default = "default_soft_surface_catalog")]
    pub soft_surface: PathBuf,

    #[serde(default = "default_hard_surface_catalog")]
    pub hard_surface: PathBuf,
}

fn default_all_catalog() -> PathBuf {
    PathBuf::from("data/cache/cached_all_products.json")
}

fn default_soft_surface_catalog() -> PathBuf {
    PathBuf::from("data/cache/cached_soft_surface_products.json")
}

fn default_hard_surface_catalog() -> PathBuf {
    PathBuf::from("data/cache/cached_hard_surface_products.json")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            all: default_all_catalog(),
            soft_surface: default_soft_surface_catalog(),
            hard_surface: default_hard_surface_catalog(),
        }
    }
}

/// Relational product store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from(".floorwise/products.sqlite")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Vector search backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// "sqlite" (local chunk index) or "azure" (Azure AI Search)
    #[serde(default = "default_search_backend")]
    pub backend: String,

    /// Local chunk index for the sqlite backend
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Search service endpoint for the azure backend
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the search service key
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default = "default_search_api_version")]
    pub api_version: String,

    /// Index name per partition; defaults to the partition name
    #[serde(default)]
    pub indexes: HashMap<String, String>,

    /// Query embedding settings
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

fn default_search_backend() -> String {
    "sqlite".to_string()
}

fn default_index_path() -> PathBuf {
    PathBuf::from(".floorwise/chunks.sqlite")
}

fn default_search_api_version() -> String {
    "2023-11-01".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: default_search_backend(),
            index_path: default_index_path(),
            endpoint: None,
            api_key_env: None,
            api_version: default_search_api_version(),
            indexes: HashMap::new(),
            embedding: EmbeddingSettings::default(),
        }
    }
}

/// Query embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingSettings {
    /// "trigram", "ollama" or "openai"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    retrieval: Option<RetrievalConfig>,
    catalog: Option<CatalogConfig>,
    database: Option<DatabaseConfig>,
    search: Option<SearchConfig>,
    server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            retrieval: RetrievalConfig::default(),
            catalog: CatalogConfig::default(),
            database: DatabaseConfig::default(),
            search: SearchConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `FLOORWISE_WORKSPACE`: Override workspace path
    /// - `FLOORWISE_CONFIG`: Path to config file
    /// - `FLOORWISE_PROVIDER`: LLM provider
    /// - `FLOORWISE_MODEL`: Model identifier
    /// - `FLOORWISE_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking precedence over the environment when locating the YAML file.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var("FLOORWISE_WORKSPACE").ok().map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("FLOORWISE_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.floorwise_dir().join("config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("FLOORWISE_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("FLOORWISE_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("FLOORWISE_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = match provider_config {
                    ProviderConfig::OpenAI { model, .. } => model.clone(),
                    ProviderConfig::Ollama { model, .. } => model.clone(),
                };
            }

            result.llm = Some(llm);
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(catalog) = config_file.catalog {
            result.catalog = catalog;
        }
        if let Some(database) = config_file.database {
            result.database = database;
        }
        if let Some(search) = config_file.search {
            result.search = search;
        }
        if let Some(server) = config_file.server {
            result.server = server;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .floorwise directory.
    pub fn floorwise_dir(&self) -> PathBuf {
        self.workspace.join(".floorwise")
    }

    /// Resolve a configured path against the workspace root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Get the configuration block for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Resolve API key from environment variable.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider)? {
            ProviderConfig::OpenAI { api_key_env, .. } => std::env::var(&api_key_env).ok(),
            ProviderConfig::Ollama { .. } => None,
        }
    }

    /// Validate configuration for the active provider and pipeline budgets.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.provider;
        let known_providers = ["openai", "ollama"];

        if !known_providers.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                known_providers.join(", ")
            )));
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) =
            self.get_provider_config(provider)
        {
            if self.api_key.is_none() && std::env::var(&api_key_env).is_err() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    api_key_env
                )));
            }
        }

        let retrieval = &self.retrieval;
        if retrieval.top_k == 0 || retrieval.row_limit == 0 || retrieval.max_context_words == 0 {
            return Err(AppError::Config(
                "retrieval.topK, retrieval.rowLimit and retrieval.maxContextWords must be positive"
                    .to_string(),
            ));
        }

        if !["sqlite", "azure"].contains(&self.search.backend.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown search backend: {}. Supported: sqlite, azure",
                self.search.backend
            )));
        }

        Ok(())
    }
}
