//! Prompt system for RAGBot.
//!
//! This crate provides:
//! - The built-in grounded FAQ and no-context system prompts
//! - Handlebars rendering of the `context_str` slot
//! - YAML overrides loaded from the workspace

pub mod builder;
pub mod loader;
pub mod templates;
pub mod types;

// Re-export main types
pub use builder::PromptTemplates;
pub use loader::{load_prompt, load_templates, FAQ_PROMPT_ID, NO_CONTEXT_PROMPT_ID};
pub use templates::{CONTEXT_SLOT, FAQ_SYSTEM_PROMPT, NO_CONTEXT_SYSTEM_PROMPT};
pub use types::PromptDefinition;
