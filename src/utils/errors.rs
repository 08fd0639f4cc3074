use thiserror::Error;

use crate::browser::BrowserError;

/// Batch-level failures surfaced to the caller of `Pipeline::run`
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Malformed request, rejected before any rendering starts
    #[error("{0}")]
    Validation(String),

    /// Anything escaping the per-URL boundaries
    #[error("Scrape failed: {0}")]
    Fatal(String),
}

impl ScrapeError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ScrapeError::Validation(_))
    }
}

/// Per-URL rendering failures, recovered by the orchestrator
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),

    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation timeout after {timeout_ms}ms for URL: {url}")]
    Timeout { url: String, timeout_ms: u128 },

    #[error("Navigation failed for URL {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Failed to read page content: {0}")]
    Content(String),
}

/// Implement From<BrowserError> for RenderError
impl From<BrowserError> for RenderError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::LaunchFailed(msg) => RenderError::Launch(msg),
            BrowserError::PageCreationFailed(msg) => RenderError::Launch(msg),
        }
    }
}

/// Per-URL extraction failures, recovered inside the extraction client
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Request error: {0}")]
    Request(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// 401/403: the key itself was refused, so every later call fails too
    #[error("API key rejected (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("JSON parse error: {0}")]
    Parse(String),
}

/// The extraction service refused the API key for the whole batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Extraction service rejected the API key (status {status}): {message}")]
pub struct CredentialRejected {
    pub status: u16,
    pub message: String,
}

/// Implement From<reqwest::Error> for ExtractionError
impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        ExtractionError::Request(err.to_string())
    }
}

/// Implement From<serde_json::Error> for ExtractionError
impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::Parse(err.to_string())
    }
}
