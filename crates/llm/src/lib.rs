//! Chat-streaming integration for RAGBot.
//!
//! Provider-agnostic access to chat models through the [`LlmClient`] trait.
//!
//! # Providers
//! - **OpenRouter**: hosted models over an OpenAI-compatible SSE API (default)
//! - **Ollama**: local runtime
//!
//! # Example
//! ```no_run
//! use futures::StreamExt;
//! use ragbot_llm::{ChatMessage, ChatRequest, LlmClient, OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = ChatRequest::new(vec![ChatMessage::user("Hello!")], "llama3.2");
//! let mut stream = client.stream_chat(&request).await?;
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk?.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{
    ChatMessage, ChatRequest, ChatRole, LlmClient, LlmStream, LlmStreamChunk, LlmUsage,
};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenRouterClient};
pub use types::ProviderType;
