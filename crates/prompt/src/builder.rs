//! Prompt builder for rendering definitions into request text.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use floorwise_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde_json::{Map, Value};

/// Render a prompt definition with the given variables.
///
/// Both the system text and the user template are rendered with Handlebars
/// (HTML escaping disabled). Variables may be strings or arrays, so templates
/// can iterate vocabularies with `{{#each}}`.
///
/// # Example
/// ```no_run
/// use floorwise_prompt::{build_prompt, load_builtin};
/// use serde_json::json;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_builtin("retrieval.answer")?;
/// let vars = json!({"context": "...", "question": "Which backings exist?"});
/// let built = build_prompt(&def, vars.as_object().unwrap())?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: &Map<String, Value>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    let system = if definition.system.trim().is_empty() {
        None
    } else {
        Some(render(&mut handlebars, "system", &definition.system, variables)?)
    };
    let user = render(&mut handlebars, "user", &definition.template, variables)?;

    Ok(BuiltPrompt {
        system,
        user,
        temperature: definition.behavior.temperature,
        max_tokens: definition.behavior.max_tokens,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            resolved_variables: variables.keys().cloned().collect(),
        },
    })
}

fn render(
    handlebars: &mut Handlebars<'_>,
    name: &str,
    template: &str,
    variables: &Map<String, Value>,
) -> AppResult<String> {
    handlebars
        .register_template_string(name, template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template '{}': {}", name, e)))?;

    handlebars
        .render(name, variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template '{}': {}", name, e)))
}
