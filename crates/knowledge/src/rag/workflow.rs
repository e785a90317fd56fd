//! The question-answering workflow.
//!
//! A question moves through an explicit state machine:
//!
//! ```text
//! Start -> Retrieved -> Filtered -> Responding -> Done
//!   |          |                      ^
//!   +----------+------> NoContext ----+
//! ```
//!
//! Empty retrieval or an empty filtered set routes to `NoContext`, which
//! uses the fixed decline prompt instead of the grounded one. Both branches
//! end in [`QaWorkflow::respond`].

use crate::filter::RelevanceFilter;
use crate::rag::context::build_context_str;
use crate::rag::types::{TokenStream, WorkflowConfig, WorkflowResult};
use crate::retriever::Retriever;
use crate::types::PassageSet;
use futures::{future, StreamExt};
use ragbot_core::{AppError, AppResult};
use ragbot_llm::{ChatMessage, ChatRequest, LlmClient, LlmStream};
use ragbot_prompt::PromptTemplates;
use std::sync::Arc;
use tracing::Instrument;

enum WorkflowState {
    Start,
    Retrieved(PassageSet),
    Filtered(PassageSet),
    NoContext,
    Responding {
        messages: Vec<ChatMessage>,
        sources: PassageSet,
    },
    Done(WorkflowResult),
}

impl WorkflowState {
    fn name(&self) -> &'static str {
        match self {
            WorkflowState::Start => "start",
            WorkflowState::Retrieved(_) => "retrieved",
            WorkflowState::Filtered(_) => "filtered",
            WorkflowState::NoContext => "no_context",
            WorkflowState::Responding { .. } => "responding",
            WorkflowState::Done(_) => "done",
        }
    }
}

/// Retrieval-augmented FAQ answering.
///
/// Holds only shared, read-only collaborators, so one instance can serve
/// concurrent questions.
#[derive(Clone)]
pub struct QaWorkflow {
    retriever: Arc<dyn Retriever>,
    client: Arc<dyn LlmClient>,
    templates: PromptTemplates,
    filter: RelevanceFilter,
    config: WorkflowConfig,
}

impl QaWorkflow {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        client: Arc<dyn LlmClient>,
        templates: PromptTemplates,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            retriever,
            client,
            filter: RelevanceFilter::new(config.similarity_cutoff),
            templates,
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Answer a question, returning the token stream and the passages that
    /// grounded it.
    ///
    /// Retrieval, filtering and stream initiation together are bounded by
    /// the configured timeout. Consuming the returned stream is not.
    pub async fn answer(&self, question: &str) -> AppResult<WorkflowResult> {
        let span = tracing::info_span!("qa_workflow", provider = self.client.provider_name());
        let timeout = self.config.timeout;

        async move {
            tracing::info!("Answering question ({} chars)", question.chars().count());

            match tokio::time::timeout(timeout, self.run(question)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("Workflow timed out after {:?}", timeout);
                    Err(AppError::Timeout(timeout))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, question: &str) -> AppResult<WorkflowResult> {
        let mut state = WorkflowState::Start;

        loop {
            tracing::debug!(state = state.name(), "workflow transition");

            state = match state {
                WorkflowState::Start => {
                    let raw = self
                        .retriever
                        .retrieve(question, self.config.top_k)
                        .await
                        .map_err(AppError::into_retrieval)?;

                    if raw.is_empty() {
                        tracing::info!("No passages retrieved");
                        WorkflowState::NoContext
                    } else {
                        WorkflowState::Retrieved(raw)
                    }
                }

                WorkflowState::Retrieved(raw) => {
                    let max_score = raw.max_score().unwrap_or(0.0);
                    let filtered = self.filter.filter(raw);

                    if filtered.is_empty() {
                        tracing::info!(
                            "No passages above cutoff {:.2} (best {:.3})",
                            self.filter.cutoff(),
                            max_score
                        );
                        WorkflowState::NoContext
                    } else {
                        WorkflowState::Filtered(filtered)
                    }
                }

                WorkflowState::Filtered(passages) => {
                    let context_str = build_context_str(&passages);
                    let system = self.templates.render_faq(&context_str)?;

                    tracing::info!("Answering from {} FAQ passages", passages.len());
                    tracing::debug!("Context:\n{}", context_str);

                    WorkflowState::Responding {
                        messages: vec![ChatMessage::system(system), ChatMessage::user(question)],
                        sources: passages,
                    }
                }

                WorkflowState::NoContext => WorkflowState::Responding {
                    messages: vec![
                        ChatMessage::system(self.templates.no_context()),
                        ChatMessage::user(question),
                    ],
                    sources: PassageSet::empty(),
                },

                WorkflowState::Responding { messages, sources } => {
                    WorkflowState::Done(self.respond(messages, sources).await?)
                }

                WorkflowState::Done(result) => return Ok(result),
            };
        }
    }

    /// Start the chat stream for either branch.
    async fn respond(
        &self,
        messages: Vec<ChatMessage>,
        sources: PassageSet,
    ) -> AppResult<WorkflowResult> {
        let mut request = ChatRequest::new(messages, self.config.model.clone());
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        tracing::debug!(
            "Requesting stream from {} (model: {}, {} messages)",
            self.client.provider_name(),
            request.model,
            request.messages.len()
        );

        let stream = self
            .client
            .stream_chat(&request)
            .await
            .map_err(AppError::into_streaming)?;

        Ok(WorkflowResult::new(token_stream(stream), sources))
    }
}

/// Map provider chunks to text deltas.
///
/// Ends after the provider's final chunk or after yielding the first error.
fn token_stream(stream: LlmStream) -> TokenStream {
    let tokens = stream
        .scan(false, |finished, item| {
            if *finished {
                return future::ready(None);
            }

            let next = match item {
                Ok(chunk) => {
                    *finished = chunk.done;
                    Ok(chunk.content)
                }
                Err(e) => {
                    *finished = true;
                    tracing::warn!("Answer stream failed: {}", e);
                    Err(e.into_streaming())
                }
            };
            future::ready(Some(next))
        })
        .filter(|item| future::ready(!matches!(item, Ok(text) if text.is_empty())));

    Box::pin(tokens)
}
