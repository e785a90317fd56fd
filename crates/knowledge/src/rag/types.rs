//! QA workflow types.

use crate::filter::DEFAULT_SIMILARITY_CUTOFF;
use crate::types::PassageSet;
use futures::{Stream, StreamExt};
use ragbot_core::{AppConfig, AppResult};
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

/// Default number of passages requested from the retriever.
pub const DEFAULT_TOP_K: usize = 5;

/// Default bound on retrieval plus stream initiation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.2-3b-instruct";

/// Lazy, single-pass sequence of answer text deltas.
///
/// After a failure the stream yields the error once and then ends.
pub type TokenStream = Pin<Box<dyn Stream<Item = AppResult<String>> + Send>>;

/// Outcome of one `answer` call.
pub struct WorkflowResult {
    /// Answer tokens as they arrive from the model
    pub tokens: TokenStream,

    /// Passages that grounded the prompt; empty for the no-context branch
    pub sources: PassageSet,
}

impl WorkflowResult {
    pub fn new(tokens: TokenStream, sources: PassageSet) -> Self {
        Self { tokens, sources }
    }

    /// Drain the token stream into a single string.
    pub async fn collect(self) -> AppResult<(String, PassageSet)> {
        let mut answer = String::new();
        let mut tokens = self.tokens;
        while let Some(token) = tokens.next().await {
            answer.push_str(&token?);
        }
        Ok((answer, self.sources))
    }
}

impl fmt::Debug for WorkflowResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowResult")
            .field("tokens", &"<stream>")
            .field("sources", &self.sources)
            .finish()
    }
}

/// Immutable settings of a [`crate::rag::QaWorkflow`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    pub top_k: usize,
    pub similarity_cutoff: f32,
    pub timeout: Duration,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            similarity_cutoff: DEFAULT_SIMILARITY_CUTOFF,
            timeout: DEFAULT_TIMEOUT,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(1000),
            temperature: Some(0.1),
        }
    }
}

impl From<&AppConfig> for WorkflowConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            top_k: config.workflow.top_k,
            similarity_cutoff: config.workflow.similarity_cutoff,
            timeout: config.workflow.timeout(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkflowConfig::default();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.similarity_cutoff, 0.85);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_from_app_config() {
        let mut app = AppConfig::default();
        app.model = "llama3.2".to_string();
        app.workflow.top_k = 3;
        app.workflow.timeout_secs = 10;

        let config = WorkflowConfig::from(&app);
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.top_k, 3);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn test_collect_concatenates_tokens() {
        let tokens: TokenStream = Box::pin(futures::stream::iter(vec![
            Ok("Hel".to_string()),
            Ok("lo".to_string()),
        ]));
        let (answer, sources) = WorkflowResult::new(tokens, PassageSet::empty())
            .collect()
            .await
            .unwrap();
        assert_eq!(answer, "Hello");
        assert!(sources.is_empty());
    }
}
