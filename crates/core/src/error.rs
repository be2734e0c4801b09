//! Error types for Floorwise.
//!
//! A single error enum covers every failure category in the workspace. The
//! retrieval pipeline sorts these into "recovered locally" (extraction parse
//! failures), "aborts the request" (upstream services, bad partitions) and
//! plain setup errors (configuration, I/O).

use thiserror::Error;

/// Unified error type for Floorwise.
///
/// All fallible functions return `Result<T, AppError>`.
/// Errors are represented and propagated, never panicked on.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown domain partition, rejected before any retrieval runs
    #[error("Invalid partition: {0}")]
    InvalidPartition(String),

    /// Generation output that could not be read as a filter object
    #[error("Extraction parse error: {0}")]
    ExtractionParse(String),

    /// Generation backend errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Vector search and embedding backend errors
    #[error("Search error: {0}")]
    Search(String),

    /// Relational product store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Catalog snapshot errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error came from one of the external services the
    /// pipeline depends on (generation, vector search, relational store).
    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::Llm(_) | AppError::Search(_) | AppError::Store(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        assert!(AppError::Llm("down".into()).is_upstream());
        assert!(AppError::Search("timeout".into()).is_upstream());
        assert!(AppError::Store("locked".into()).is_upstream());
        assert!(!AppError::InvalidPartition("x".into()).is_upstream());
        assert!(!AppError::ExtractionParse("bad".into()).is_upstream());
    }

    #[test]
    fn test_display_includes_category() {
        let err = AppError::InvalidPartition("kitchen".to_string());
        assert_eq!(err.to_string(), "Invalid partition: kitchen");
    }
}
