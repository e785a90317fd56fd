//! Startup wiring: configuration to a ready [`QaWorkflow`].

use ragbot_core::{AppConfig, AppResult};
use ragbot_knowledge::{load_index, QaWorkflow, WorkflowConfig};
use ragbot_llm::create_client;
use ragbot_prompt::load_templates;
use std::sync::Arc;

/// Build the chat client, prompts and FAQ index described by `config`.
pub async fn build_workflow(config: &AppConfig) -> AppResult<QaWorkflow> {
    config.validate()?;

    let api_key = config.resolve_api_key();
    let client = create_client(&config.provider, config.endpoint.as_deref(), api_key.as_deref())?;

    let templates = load_templates(&config.prompts_dir())?;
    let index = load_index(&config.data_dir(), &config.embedding).await?;

    tracing::info!(
        "Workflow ready: provider={}, model={}, top_k={}, cutoff={:.2}",
        config.provider,
        config.model,
        config.workflow.top_k,
        config.workflow.similarity_cutoff
    );

    Ok(QaWorkflow::new(
        Arc::new(index),
        client,
        templates,
        WorkflowConfig::from(config),
    ))
}
