//! Ollama chat provider.
//!
//! Streams answers from a local Ollama runtime through `/api/chat`, which
//! replies with newline-delimited JSON objects.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use super::lines::split_lines;
use crate::client::{ChatMessage, ChatRequest, LlmClient, LlmStream, LlmStreamChunk, LlmUsage};
use futures::StreamExt;
use ragbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Ollama chat request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize, PartialEq)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// One line of an Ollama chat stream.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

/// Ollama chat client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client against the default local URL.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_OLLAMA_URL)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn to_ollama_request<'a>(&self, request: &'a ChatRequest) -> OllamaChatRequest<'a> {
        let options = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            })
        } else {
            None
        };

        OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: true,
            options,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one NDJSON line into a stream chunk.
fn parse_chat_line(line: &str) -> AppResult<LlmStreamChunk> {
    let response: OllamaChatResponse = serde_json::from_str(line)
        .map_err(|e| AppError::Streaming(format!("Failed to parse chunk: {}", e)))?;

    if let Some(error) = response.error {
        return Err(AppError::Streaming(format!("Ollama error: {}", error)));
    }

    let content = response.message.map(|m| m.content).unwrap_or_default();

    Ok(LlmStreamChunk {
        content,
        model: response.model,
        done: response.done,
        usage: if response.done {
            Some(LlmUsage::new(
                response.prompt_eval_count.unwrap_or(0),
                response.eval_count.unwrap_or(0),
            ))
        } else {
            None
        },
    })
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn stream_chat(&self, request: &ChatRequest) -> AppResult<LlmStream> {
        tracing::info!("Starting streaming chat request to Ollama");
        tracing::debug!("Request: {:?}", request);

        let url = format!("{}/api/chat", self.base_url);
        let body = self.to_ollama_request(request);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let stream = split_lines(response.bytes_stream())
            .map(|line| line.and_then(|line| parse_chat_line(&line)));

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OllamaClient::with_base_url("http://gpu-box:11434/");
        assert_eq!(client.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn test_ollama_request_conversion() {
        let client = OllamaClient::new();
        let request = ChatRequest::new(
            vec![ChatMessage::system("be brief"), ChatMessage::user("Hello")],
            "llama3.2",
        )
        .with_temperature(0.1)
        .with_max_tokens(100);

        let body = serde_json::to_value(client.to_ollama_request(&request)).unwrap();
        assert_eq!(body["model"], "llama3.2");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hello");
        assert_eq!(body["options"]["num_predict"], 100);
    }

    #[test]
    fn test_request_without_options_omits_them() {
        let client = OllamaClient::new();
        let request = ChatRequest::new(vec![ChatMessage::user("Hi")], "llama3.2");
        let body = serde_json::to_value(client.to_ollama_request(&request)).unwrap();
        assert!(body.get("options").is_none());
    }

    #[test]
    fn test_parse_delta_line() {
        let chunk = parse_chat_line(
            r#"{"model":"llama3.2","message":{"role":"assistant","content":"Insulin"},"done":false}"#,
        )
        .unwrap();
        assert_eq!(chunk.content, "Insulin");
        assert!(!chunk.done);
        assert!(chunk.usage.is_none());
    }

    #[test]
    fn test_parse_final_line() {
        let chunk = parse_chat_line(
            r#"{"model":"llama3.2","message":{"role":"assistant","content":""},"done":true,"prompt_eval_count":40,"eval_count":12}"#,
        )
        .unwrap();
        assert!(chunk.done);
        assert_eq!(chunk.usage, Some(LlmUsage::new(40, 12)));
    }

    #[test]
    fn test_parse_error_line() {
        let result = parse_chat_line(r#"{"error":"model 'nope' not found"}"#);
        match result {
            Err(AppError::Streaming(msg)) => assert!(msg.contains("not found")),
            other => panic!("Expected streaming error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_garbage_line() {
        assert!(matches!(
            parse_chat_line("not json"),
            Err(AppError::Streaming(_))
        ));
    }
}
