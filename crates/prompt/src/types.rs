//! Prompt types.

use serde::{Deserialize, Serialize};

/// A prompt definition loaded from YAML.
///
/// ```yaml
/// id: faq
/// title: Diabetes FAQ assistant
/// apiVersion: "1.0"
/// template: |
///   Answer using only these entries:
///   {{context_str}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Template string with Handlebars syntax
    pub template: String,
}
