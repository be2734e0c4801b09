//! Prompt types.

use serde::{Deserialize, Serialize};

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier (e.g., "retrieval.filters")
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Sampling settings applied to the request
    #[serde(default)]
    pub behavior: PromptBehavior,

    /// System instructions, Handlebars syntax
    #[serde(default)]
    pub system: String,

    /// User-turn template, Handlebars syntax
    pub template: String,
}

/// Sampling settings for prompt execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptBehavior {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(rename = "maxTokens", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A fully rendered prompt ready for the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (None when the definition has no system text)
    pub system: Option<String>,

    /// User message
    pub user: String,

    pub temperature: Option<f32>,

    #[serde(rename = "maxTokens")]
    pub max_tokens: Option<u32>,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Names of the variables supplied at render time
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: Vec<String>,
}
