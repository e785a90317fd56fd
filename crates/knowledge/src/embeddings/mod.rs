//! Embedding generation for the FAQ index.
//!
//! Providers turn question text into fixed-size vectors. The same provider
//! must embed both the corpus and incoming questions.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{OllamaEmbeddingProvider, TrigramProvider};
