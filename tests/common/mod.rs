#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gig_scout::extraction::normalize::{normalize, parse_reply};
use gig_scout::{CredentialRejected, Event, EventExtractor, RenderError, Renderer, ScrapedContent};

/// What the fake renderer does for a given URL
#[derive(Clone)]
pub enum Script {
    Text(String),
    Timeout,
    Hang(Duration),
}

#[derive(Default)]
pub struct FakeRenderer {
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
}

impl FakeRenderer {
    pub fn with(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(&self, url: &str) -> Result<ScrapedContent, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.scripts.get(url).cloned() {
            Some(Script::Text(text)) => Ok(ScrapedContent {
                text,
                screenshot: Some("QUJD".into()),
            }),
            Some(Script::Timeout) => Err(RenderError::Timeout {
                url: url.to_string(),
                timeout_ms: 30_000,
            }),
            Some(Script::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Ok(ScrapedContent::default())
            }
            None => Err(RenderError::Navigation {
                url: url.to_string(),
                message: "unscripted URL".into(),
            }),
        }
    }
}

/// Answers with a canned model reply per URL, run through the real
/// normalization path
#[derive(Default)]
pub struct CannedExtractor {
    replies: HashMap<String, String>,
    refused_status: Option<u16>,
    seen: Mutex<Vec<(String, String, bool)>>,
}

impl CannedExtractor {
    /// Answer every call as if the service refused the key
    pub fn refusing(status: u16) -> Self {
        Self {
            refused_status: Some(status),
            ..Self::default()
        }
    }

    pub fn reply(mut self, url: &str, json: &str) -> Self {
        self.replies.insert(url.to_string(), json.to_string());
        self
    }

    /// `(url, content, had_screenshot)` for every extract call
    pub fn seen(&self) -> Vec<(String, String, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventExtractor for CannedExtractor {
    async fn extract(
        &self,
        content: &str,
        screenshot: Option<&str>,
        source_url: &str,
        _api_key: &str,
    ) -> Result<Vec<Event>, CredentialRejected> {
        self.seen.lock().unwrap().push((
            source_url.to_string(),
            content.to_string(),
            screenshot.is_some(),
        ));

        if let Some(status) = self.refused_status {
            return Err(CredentialRejected {
                status,
                message: "invalid_api_key".into(),
            });
        }

        let Some(reply) = self.replies.get(source_url) else {
            return Ok(Vec::new());
        };
        Ok(match parse_reply(reply) {
            Ok(raw) => raw.into_iter().map(|r| normalize(r, source_url)).collect(),
            Err(_) => Vec::new(),
        })
    }
}
