//! Error types for RAGBot.
//!
//! A single error enum covers configuration, I/O, LLM, prompt, knowledge and
//! question-answering failures. The three request-fatal categories of the
//! QA workflow (retrieval, streaming, timeout) each get their own variant so
//! callers can tell them apart without string matching.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for RAGBot.
///
/// All library functions return `Result<T, AppError>`.
/// We never panic; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors outside of a streamed answer
    #[error("LLM error: {0}")]
    Llm(String),

    /// FAQ corpus, embedding and index errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The vector index could not serve a query
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// The chat-streaming capability failed at initiation or mid-stream
    #[error("Streaming failed: {0}")]
    Streaming(String),

    /// The workflow did not finish within its time budget
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Rejected user input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Reclassify an error raised while talking to the chat provider.
    pub fn into_streaming(self) -> Self {
        match self {
            AppError::Streaming(_) | AppError::Timeout(_) => self,
            other => AppError::Streaming(other.to_string()),
        }
    }

    /// Reclassify an error raised while querying the index.
    pub fn into_retrieval(self) -> Self {
        match self {
            AppError::Retrieval(_) | AppError::Timeout(_) => self,
            other => AppError::Retrieval(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
