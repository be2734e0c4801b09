//! Prompt management for Floorwise.
//!
//! - YAML prompt definitions, built in or overridden per workspace
//! - Handlebars rendering of system and user text

pub mod builder;
pub mod loader;
pub mod types;

pub use builder::build_prompt;
pub use loader::{list_prompts, load_builtin, load_prompt, ANSWER_PROMPT_ID, FILTER_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition};
