//! Rendering of the two system prompts.

use crate::templates::{CONTEXT_SLOT, FAQ_SYSTEM_PROMPT, NO_CONTEXT_SYSTEM_PROMPT};
use handlebars::Handlebars;
use ragbot_core::{AppError, AppResult};
use std::collections::HashMap;

const FAQ_TEMPLATE_NAME: &str = "faq";

/// Marker used to check that a FAQ template really substitutes its slot.
const SLOT_MARKER: &str = "\u{1}ragbot-context-marker\u{1}";

/// The pair of system prompts used by the QA workflow.
///
/// Built once at startup and shared read-only; rendering never mutates it.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    registry: Handlebars<'static>,
    faq_template: String,
    no_context: String,
}

impl PromptTemplates {
    /// Compile a FAQ template and pair it with a no-context prompt.
    ///
    /// Fails if the FAQ template does not parse, references variables other
    /// than `context_str`, or never emits the substituted context.
    pub fn new(faq_template: impl Into<String>, no_context: impl Into<String>) -> AppResult<Self> {
        let faq_template = faq_template.into();
        let no_context = no_context.into();

        if no_context.trim().is_empty() {
            return Err(AppError::Prompt(
                "No-context prompt cannot be empty".to_string(),
            ));
        }

        let mut registry = Handlebars::new();

        // Plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);

        registry
            .register_template_string(FAQ_TEMPLATE_NAME, &faq_template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        let templates = Self {
            registry,
            faq_template,
            no_context,
        };

        let rendered = templates.render_faq(SLOT_MARKER)?;
        if !rendered.contains(SLOT_MARKER) {
            return Err(AppError::Prompt(format!(
                "FAQ template must substitute {{{{{}}}}}",
                CONTEXT_SLOT
            )));
        }

        Ok(templates)
    }

    /// The prompts shipped with RAGBot.
    pub fn builtin() -> AppResult<Self> {
        Self::new(FAQ_SYSTEM_PROMPT, NO_CONTEXT_SYSTEM_PROMPT)
    }

    /// Render the grounded FAQ prompt with the given context string.
    pub fn render_faq(&self, context_str: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert(CONTEXT_SLOT, context_str);

        self.registry
            .render(FAQ_TEMPLATE_NAME, &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
    }

    /// The fixed prompt for questions without usable context.
    pub fn no_context(&self) -> &str {
        &self.no_context
    }

    /// The raw FAQ template source.
    pub fn faq_template(&self) -> &str {
        &self.faq_template
    }
}
