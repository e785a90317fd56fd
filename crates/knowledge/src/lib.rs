//! FAQ knowledge base and question-answering workflow.
//!
//! Reads a JSON FAQ corpus, embeds it into an in-memory index, and answers
//! questions by retrieving, filtering and streaming a grounded response.

pub mod embeddings;
pub mod filter;
pub mod index;
pub mod rag;
pub mod reader;
pub mod retriever;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use filter::{RelevanceFilter, DEFAULT_SIMILARITY_CUTOFF};
pub use index::FaqIndex;
pub use rag::{QaWorkflow, TokenStream, WorkflowConfig, WorkflowResult};
pub use retriever::Retriever;
pub use types::{FaqDocument, FaqEntry, PassageSet, ScoredPassage};

use ragbot_core::{AppError, AppResult, EmbeddingSettings};
use std::path::Path;
use std::time::Instant;

/// Read the FAQ corpus under `data_dir` and build a searchable index.
pub async fn load_index(data_dir: &Path, settings: &EmbeddingSettings) -> AppResult<FaqIndex> {
    let start = Instant::now();

    let documents = reader::read_faq_dir(data_dir)?;
    if documents.is_empty() {
        tracing::warn!(
            "No FAQ questions found in {:?}; every question will take the no-context path",
            data_dir
        );
    }

    let embedder = embeddings::create_provider(settings)
        .await
        .map_err(|e| AppError::Knowledge(format!("Failed to create embedding provider: {}", e)))?;

    let index = FaqIndex::build(documents, embedder).await?;

    tracing::info!(
        "FAQ index ready: {} documents in {:.2}s",
        index.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(index)
}
