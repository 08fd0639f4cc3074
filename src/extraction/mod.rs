//! Extraction client: shaped content + screenshot in, normalized events out
//!
//! The model reply is untrusted. It is parsed into [`normalize::RawEvent`]
//! and mapped onto [`Event`] in exactly one place; nothing downstream sees
//! the raw payload. Every failure stays inside this module except a refused
//! API key, which is reported as [`CredentialRejected`].

mod client;
pub mod normalize;
pub mod prompt;

use async_trait::async_trait;
use chrono::Local;
use std::time::Duration;
use tracing::{debug, warn};

use crate::events::Event;
use crate::utils::{CredentialRejected, ExtractionError, truncate_to_char_boundary};
use crate::{Config, ExtractionConfig};
use client::{ChatClient, ChatMessage, ChatRequest, ContentPart, ResponseFormat};

/// Turns shaped page content into events
///
/// Per-call failures are logged and yield no events. Only a key the service
/// refuses outright is returned as an error, since it dooms the whole batch.
#[async_trait]
pub trait EventExtractor: Send + Sync {
    async fn extract(
        &self,
        content: &str,
        screenshot: Option<&str>,
        source_url: &str,
        api_key: &str,
    ) -> Result<Vec<Event>, CredentialRejected>;
}

/// Extractor backed by an OpenAI-compatible Chat Completions endpoint
pub struct OpenAiExtractor {
    client: ChatClient,
    config: ExtractionConfig,
}

impl OpenAiExtractor {
    pub fn new(config: ExtractionConfig) -> anyhow::Result<Self> {
        let client = ChatClient::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self { client, config })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.extraction.clone())
    }

    fn build_request(&self, content: &str, screenshot: Option<&str>, source_url: &str) -> ChatRequest {
        let content = truncate_to_char_boundary(content, self.config.max_content_chars);
        let today = Local::now().date_naive();

        let mut parts = vec![ContentPart::Text {
            text: prompt::user_prompt(content, source_url),
        }];
        if let Some(image) = screenshot {
            parts.push(ContentPart::jpeg(image));
        }

        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(prompt::system_prompt(today)),
                ChatMessage::user(parts),
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: ResponseFormat::json_object(),
        }
    }

    async fn try_extract(
        &self,
        content: &str,
        screenshot: Option<&str>,
        source_url: &str,
        api_key: &str,
    ) -> Result<Vec<Event>, ExtractionError> {
        let request = self.build_request(content, screenshot, source_url);
        let reply = self.client.complete(&request, api_key).await?;

        let events = normalize::parse_reply(&reply)?
            .into_iter()
            .map(|raw| normalize::normalize(raw, source_url))
            .collect();

        Ok(events)
    }
}

#[async_trait]
impl EventExtractor for OpenAiExtractor {
    async fn extract(
        &self,
        content: &str,
        screenshot: Option<&str>,
        source_url: &str,
        api_key: &str,
    ) -> Result<Vec<Event>, CredentialRejected> {
        let result = self.try_extract(content, screenshot, source_url, api_key).await;
        recover(result, source_url)
    }
}

/// Swallow per-call errors into an empty result, keep a refused key
fn recover(
    result: Result<Vec<Event>, ExtractionError>,
    source_url: &str,
) -> Result<Vec<Event>, CredentialRejected> {
    match result {
        Ok(events) => {
            debug!(url = %source_url, count = events.len(), "Extracted events");
            Ok(events)
        }
        Err(ExtractionError::Unauthorized { status, message }) => {
            Err(CredentialRejected { status, message })
        }
        Err(e) => {
            warn!(url = %source_url, "Extraction failed: {}", e);
            Ok(Vec::new())
        }
    }
}
