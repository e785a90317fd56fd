//! Retrieval contract consumed by the QA workflow.

use crate::types::PassageSet;
use ragbot_core::AppResult;

/// Source of scored candidate passages for a question.
///
/// Implementations return at most `top_k` passages ordered by descending
/// score and fail with [`ragbot_core::AppError::Retrieval`] when the
/// underlying index cannot serve the query.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, question: &str, top_k: usize) -> AppResult<PassageSet>;
}
