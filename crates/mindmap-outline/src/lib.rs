//! Outline generation — turns extracted text into heading-structured Markdown.
//!
//! With an API key the text is sent to an OpenAI-compatible chat model.
//! Without one, a line-based heuristic builds a shallow outline offline.

pub mod client;
pub mod heuristic;
pub mod prompt;

use std::time::Duration;

use mindmap_core::document::truncate_chars;
use mindmap_core::error::Result;
use mindmap_core::options::MindmapConfig;
use mindmap_core::plugin::OutlineGenerator;

pub use client::{ChatBackend, ChatMessage, ChatRequest, HttpChatBackend};
pub use heuristic::generate_simple_mindmap;

/// Generate outline Markdown for `text`, titled `title`.
///
/// Without a credential in `config` the heuristic is used and `backend` is
/// never called. Otherwise the text, truncated to `max_chunk_chars`
/// characters, is sent in a single request; its failure is returned as is.
pub fn generate_mindmap_md(
    text: &str,
    title: &str,
    config: &MindmapConfig,
    backend: &dyn ChatBackend,
) -> Result<String> {
    let api_key = match config.credential() {
        Some(key) => key,
        None => {
            log::warn!(
                "No API key found (set {}), using simple structure extraction",
                mindmap_core::options::API_KEY_ENV
            );
            return Ok(generate_simple_mindmap(text, title));
        }
    };

    let total = text.chars().count();
    log::info!("Text length: {} characters", total);
    let chunk = truncate_chars(text, config.max_chunk_chars);
    if total > config.max_chunk_chars {
        log::warn!(
            "Text truncated to the first {} characters",
            config.max_chunk_chars
        );
    }

    let request = ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage::system(prompt::SYSTEM_PROMPT),
            ChatMessage::user(prompt::build_user_prompt(title, chunk)),
        ],
        temperature: config.temperature,
    };

    log::info!("Generating outline with {}...", config.model);
    let markdown = backend.complete(&config.base_url, api_key, &request)?;
    log::info!(
        "Outline generated, length: {} characters",
        markdown.chars().count()
    );

    Ok(markdown)
}

/// [`OutlineGenerator`] backed by a chat model, with the offline heuristic
/// as fallback when no API key is configured.
pub struct LlmOutlineGenerator {
    backend: Box<dyn ChatBackend>,
}

impl LlmOutlineGenerator {
    /// Build with an HTTP backend honoring `config.request_timeout_secs`.
    pub fn new(config: &MindmapConfig) -> Result<Self> {
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        Ok(Self::with_backend(Box::new(HttpChatBackend::new(timeout)?)))
    }

    pub fn with_backend(backend: Box<dyn ChatBackend>) -> Self {
        Self { backend }
    }
}

impl OutlineGenerator for LlmOutlineGenerator {
    fn name(&self) -> &str {
        "Chat outline"
    }

    fn generate(&self, text: &str, title: &str, config: &MindmapConfig) -> Result<String> {
        generate_mindmap_md(text, title, config, self.backend.as_ref())
    }
}
