//! OpenRouter chat provider.
//!
//! OpenRouter exposes an OpenAI-compatible `/chat/completions` endpoint that
//! streams Server-Sent Events. Each event is a `data: {json}` line; the
//! stream ends with `data: [DONE]`. Lines starting with `:` are keep-alive
//! comments.

use super::lines::split_lines;
use crate::client::{ChatMessage, ChatRequest, LlmClient, LlmStream, LlmStreamChunk, LlmUsage};
use futures::StreamExt;
use ragbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";

/// Value sent in the `X-Title` header so requests are attributed to the app.
const APP_TITLE: &str = "RAGBot";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<EventUsage>,
    #[serde(default)]
    error: Option<EventError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct EventError {
    message: String,
}

/// OpenRouter chat client.
pub struct OpenRouterClient {
    base_url: String,
    auth_header: String,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(api_key: impl AsRef<str>) -> Self {
        Self::with_base_url(api_key, DEFAULT_OPENROUTER_URL)
    }

    pub fn with_base_url(api_key: impl AsRef<str>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: format!("Bearer {}", api_key.as_ref()),
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn to_completion_request<'a>(&self, request: &'a ChatRequest) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &request.model,
            messages: &request.messages,
            stream: true,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

/// Parse one SSE line.
///
/// Returns `None` for lines that carry no content (comments, events
/// without a delta).
fn parse_sse_line(line: &str, model: &str) -> Option<AppResult<LlmStreamChunk>> {
    if line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?.trim();

    if data == "[DONE]" {
        return Some(Ok(LlmStreamChunk::finished(model, None)));
    }

    let event: StreamEvent = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            return Some(Err(AppError::Streaming(format!(
                "Failed to parse event: {}",
                e
            ))))
        }
    };

    if let Some(error) = event.error {
        return Some(Err(AppError::Streaming(format!(
            "OpenRouter error: {}",
            error.message
        ))));
    }

    let model = event.model.unwrap_or_else(|| model.to_string());
    let usage = event
        .usage
        .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens));

    let choice = event.choices.into_iter().next()?;
    let content = choice.delta.and_then(|d| d.content).unwrap_or_default();

    if content.is_empty() && choice.finish_reason.is_none() {
        return None;
    }

    Some(Ok(LlmStreamChunk {
        content,
        model,
        done: false,
        usage,
    }))
}

#[async_trait::async_trait]
impl LlmClient for OpenRouterClient {
    fn provider_name(&self) -> &str {
        "openrouter"
    }

    async fn stream_chat(&self, request: &ChatRequest) -> AppResult<LlmStream> {
        tracing::info!("Starting streaming chat request to OpenRouter");
        tracing::debug!("Request: {:?}", request);

        let response = self
            .client
            .post(self.completions_url())
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .header("X-Title", APP_TITLE)
            .json(&self.to_completion_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to OpenRouter: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "OpenRouter API error ({}): {}",
                status, error_text
            )));
        }

        let model = request.model.clone();
        let stream = split_lines(response.bytes_stream()).filter_map(move |line| {
            let parsed = match line {
                Ok(line) => parse_sse_line(&line, &model),
                Err(e) => Some(Err(e)),
            };
            futures::future::ready(parsed)
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "meta-llama/llama-3.2-3b-instruct";

    #[test]
    fn test_client_creation() {
        let client = OpenRouterClient::new("sk-or-test");
        assert_eq!(client.provider_name(), "openrouter");
        assert_eq!(
            client.completions_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(client.auth_header, "Bearer sk-or-test");
    }

    #[test]
    fn test_request_body() {
        let client = OpenRouterClient::new("sk-or-test");
        let request = ChatRequest::new(
            vec![ChatMessage::system("faq"), ChatMessage::user("What is HbA1c?")],
            MODEL,
        )
        .with_max_tokens(1000);

        let body = serde_json::to_value(client.to_completion_request(&request)).unwrap();
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], 1000);
        assert!(body.get("temperature").is_none());
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn test_parse_delta() {
        let line = r#"data: {"id":"gen-1","model":"meta-llama/llama-3.2-3b-instruct","choices":[{"index":0,"delta":{"role":"assistant","content":"Type 2"},"finish_reason":null}]}"#;
        let chunk = parse_sse_line(line, MODEL).unwrap().unwrap();
        assert_eq!(chunk.content, "Type 2");
        assert!(!chunk.done);
    }

    #[test]
    fn test_parse_done_marker() {
        let chunk = parse_sse_line("data: [DONE]", MODEL).unwrap().unwrap();
        assert!(chunk.done);
        assert!(chunk.content.is_empty());
    }

    #[test]
    fn test_comment_lines_skipped() {
        assert!(parse_sse_line(": OPENROUTER PROCESSING", MODEL).is_none());
    }

    #[test]
    fn test_non_data_lines_skipped() {
        assert!(parse_sse_line("event: message", MODEL).is_none());
    }

    #[test]
    fn test_empty_role_delta_skipped() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant","content":""},"finish_reason":null}]}"#;
        assert!(parse_sse_line(line, MODEL).is_none());
    }

    #[test]
    fn test_finish_event_carries_usage() {
        let line = r#"data: {"choices":[{"delta":{"content":""},"finish_reason":"stop"}],"usage":{"prompt_tokens":300,"completion_tokens":45}}"#;
        let chunk = parse_sse_line(line, MODEL).unwrap().unwrap();
        assert_eq!(chunk.usage, Some(LlmUsage::new(300, 45)));
    }

    #[test]
    fn test_error_event() {
        let line = r#"data: {"error":{"message":"Rate limit exceeded","code":429}}"#;
        match parse_sse_line(line, MODEL) {
            Some(Err(AppError::Streaming(msg))) => assert!(msg.contains("Rate limit")),
            other => panic!("Expected streaming error, got {:?}", other),
        }
    }
}
