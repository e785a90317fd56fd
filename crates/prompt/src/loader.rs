//! Loading of prompt overrides from YAML definitions.

use crate::builder::PromptTemplates;
use crate::templates::{FAQ_SYSTEM_PROMPT, NO_CONTEXT_SYSTEM_PROMPT};
use crate::types::PromptDefinition;
use ragbot_core::{AppError, AppResult};
use std::path::Path;

/// Prompt id of the grounded FAQ template override.
pub const FAQ_PROMPT_ID: &str = "faq";

/// Prompt id of the no-context template override.
pub const NO_CONTEXT_PROMPT_ID: &str = "no_context";

/// Load a prompt definition by ID.
///
/// Looks for `<prompts_dir>/<id>.yml`.
///
/// # Example
/// ```no_run
/// use ragbot_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new(".ragbot/prompts"), "faq")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir.join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Build the workflow's prompt pair, applying any overrides found in
/// `prompts_dir`. Missing files fall back to the built-in prompts.
pub fn load_templates(prompts_dir: &Path) -> AppResult<PromptTemplates> {
    let faq = load_override(prompts_dir, FAQ_PROMPT_ID)?
        .unwrap_or_else(|| FAQ_SYSTEM_PROMPT.to_string());
    let no_context = load_override(prompts_dir, NO_CONTEXT_PROMPT_ID)?
        .unwrap_or_else(|| NO_CONTEXT_SYSTEM_PROMPT.to_string());

    PromptTemplates::new(faq, no_context)
}

fn load_override(prompts_dir: &Path, prompt_id: &str) -> AppResult<Option<String>> {
    if !prompts_dir.join(format!("{}.yml", prompt_id)).exists() {
        return Ok(None);
    }

    let definition = load_prompt(prompts_dir, prompt_id)?;
    Ok(Some(definition.template))
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.api_version.is_empty() {
        return Err(AppError::Prompt(
            "Prompt apiVersion cannot be empty".to_string(),
        ));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
