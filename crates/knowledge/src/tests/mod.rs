//! Cross-module tests for the QA workflow.
