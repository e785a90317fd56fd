//! Chat provider factory.
//!
//! Builds the process-wide chat client from configuration values.

use crate::client::LlmClient;
use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use crate::providers::{OllamaClient, OpenRouterClient};
use crate::types::ProviderType;
use ragbot_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a chat client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openrouter", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by OpenRouter
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    let api_key = match api_key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => key,
        None if provider_type.requires_api_key() => {
            return Err(AppError::Config(format!(
                "{} provider requires API key",
                provider_type.as_str()
            )));
        }
        None => "",
    };

    match provider_type {
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_URL);
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        ProviderType::OpenRouter => {
            let client = match endpoint {
                Some(url) => OpenRouterClient::with_base_url(api_key, url),
                None => OpenRouterClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_openrouter_client() {
        let client = create_client("openrouter", None, Some("sk-or-test")).unwrap();
        assert_eq!(client.provider_name(), "openrouter");
    }

    #[test]
    fn test_openrouter_requires_api_key() {
        match create_client("openrouter", None, None) {
            Err(err) => assert!(err.to_string().contains("requires API key")),
            Ok(_) => panic!("Expected error for OpenRouter without API key"),
        }
    }

    #[test]
    fn test_openrouter_rejects_blank_api_key() {
        let result = create_client("openrouter", None, Some("  "));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
