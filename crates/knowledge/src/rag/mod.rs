//! Retrieval-augmented answering over the FAQ corpus.

pub mod context;
pub mod types;
pub mod workflow;

pub use context::build_context_str;
pub use types::{TokenStream, WorkflowConfig, WorkflowResult, DEFAULT_TOP_K};
pub use workflow::QaWorkflow;
