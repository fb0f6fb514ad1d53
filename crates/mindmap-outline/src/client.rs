//! OpenAI-compatible chat-completion client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use mindmap_core::error::{MindmapError, Result};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of a `/chat/completions` request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Something that can answer a chat request.
pub trait ChatBackend: Send + Sync {
    /// Send `request` to `base_url` authenticated with `api_key` and return
    /// the first choice's message content.
    fn complete(&self, base_url: &str, api_key: &str, request: &ChatRequest) -> Result<String>;
}

/// Blocking HTTP backend.
pub struct HttpChatBackend {
    client: reqwest::blocking::Client,
}

impl HttpChatBackend {
    /// `timeout` of `None` lets a request run as long as the server takes.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MindmapError::Generation(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl ChatBackend for HttpChatBackend {
    fn complete(&self, base_url: &str, api_key: &str, request: &ChatRequest) -> Result<String> {
        let url = completions_url(base_url);
        log::debug!("POST {} (model {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .map_err(|e| MindmapError::Generation(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| MindmapError::Generation(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(MindmapError::Generation(format!(
                "Chat API error {}: {}",
                status, body
            )));
        }

        parse_chat_response(&body)
    }
}

/// `{base_url}/chat/completions`, tolerating a trailing slash.
pub fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// First choice's content from a chat-completion response body.
pub fn parse_chat_response(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| MindmapError::Generation(format!("Failed to parse chat response: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| MindmapError::Generation("No choices in chat response".to_string()))?
        .message
        .content
        .ok_or_else(|| MindmapError::Generation("Chat response has no content".to_string()))
}
