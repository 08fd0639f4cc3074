//! Upcoming-event extraction for venue websites
//!
//! Renders each venue page in headless Chrome via chromiumoxide, shapes the
//! DOM into labeled text, and asks a vision-capable LLM to extract events.

mod browser;
pub mod browser_setup;
pub mod dates;
pub mod events;
pub mod extraction;
pub mod orchestrator;
pub mod page_extractor;
pub mod renderer;
pub mod server;
mod utils;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP boundary binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

/// Browser security and launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: Only enable for trusted content
    #[serde(default = "default_disable_security")]
    pub disable_security: bool,

    /// Window and viewport dimensions
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

/// Per-page rendering behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Navigation timeout, capped at 30s
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// How long the resource count must stay flat to count as network idle
    #[serde(default = "default_network_idle_ms")]
    pub network_idle_ms: u64,

    /// Extra wait after network idle for late client-side rendering
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Scroll through the page to trigger lazy-loaded content
    #[serde(default = "default_true")]
    pub scroll: bool,

    #[serde(default = "default_scroll_step_px")]
    pub scroll_step_px: u32,

    #[serde(default = "default_scroll_poll_ms")]
    pub scroll_poll_ms: u64,

    /// Upper bound on scroll steps so infinite feeds terminate
    #[serde(default = "default_max_scroll_steps")]
    pub max_scroll_steps: u32,

    /// Pause after scrolling back to the top, before capture
    #[serde(default = "default_post_scroll_pause_ms")]
    pub post_scroll_pause_ms: u64,

    /// Capture a full-page screenshot for the vision model
    #[serde(default = "default_true")]
    pub screenshot: bool,

    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: i64,
}

/// Extraction model settings (the API key always comes from the request)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Shaped text beyond this many characters is truncated before sending
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Wall-clock ceiling for one whole invocation
    #[serde(default = "default_invocation_timeout_secs")]
    pub invocation_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_disable_security() -> bool {
    false
}

fn default_window_width() -> u32 {
    utils::constants::VIEWPORT_WIDTH
}

fn default_window_height() -> u32 {
    utils::constants::VIEWPORT_HEIGHT
}

fn default_true() -> bool {
    true
}

fn default_navigation_timeout_ms() -> u64 {
    utils::MAX_NAVIGATION_TIMEOUT_MS
}
fn default_network_idle_ms() -> u64 {
    500
}
fn default_settle_delay_ms() -> u64 {
    2_000
}
fn default_scroll_step_px() -> u32 {
    400
}
fn default_scroll_poll_ms() -> u64 {
    100
}
fn default_max_scroll_steps() -> u32 {
    200
}
fn default_post_scroll_pause_ms() -> u64 {
    1_000
}
fn default_jpeg_quality() -> i64 {
    80
}

fn default_api_base_url() -> String {
    utils::constants::OPENAI_API_URL.to_string()
}
fn default_model() -> String {
    utils::constants::DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_request_timeout_secs() -> u64 {
    45
}
fn default_max_content_chars() -> usize {
    60_000
}

fn default_invocation_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            browser: BrowserConfig::default(),
            render: RenderConfig::default(),
            extraction: ExtractionConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_security: default_disable_security(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: default_navigation_timeout_ms(),
            network_idle_ms: default_network_idle_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            scroll: default_true(),
            scroll_step_px: default_scroll_step_px(),
            scroll_poll_ms: default_scroll_poll_ms(),
            max_scroll_steps: default_max_scroll_steps(),
            post_scroll_pause_ms: default_post_scroll_pause_ms(),
            screenshot: default_true(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            invocation_timeout_secs: default_invocation_timeout_secs(),
        }
    }
}

/// Load config from `$GIG_SCOUT_CONFIG`, else config.yaml in package root
pub fn load_yaml_config() -> anyhow::Result<Config> {
    let config_path = std::env::var_os("GIG_SCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml"));

    if config_path.exists() {
        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        parse_yaml_config(&contents)
    } else {
        Ok(Config::default())
    }
}

/// Parse a YAML document into a `Config`, filling omitted fields with defaults
pub fn parse_yaml_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = serde_yaml::from_str(contents).context("Invalid config YAML")?;
    Ok(config)
}

pub use browser::{BrowserError, BrowserResult, BrowserWrapper};
pub use events::{Event, ScrapeRequest, ScrapedContent, UrlOutcome};
pub use extraction::{EventExtractor, OpenAiExtractor};
pub use orchestrator::Pipeline;
pub use renderer::{ChromeRenderer, Renderer};
pub use utils::{CredentialRejected, ExtractionError, RenderError, ScrapeError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_render_contract() {
        let config = Config::default();
        assert_eq!(config.render.navigation_timeout_ms, 30_000);
        assert_eq!(config.render.jpeg_quality, 80);
        assert_eq!(config.browser.window.width, 1920);
        assert_eq!(config.browser.window.height, 1080);
        assert_eq!(config.pipeline.invocation_timeout_secs, 60);
        assert!(config.extraction.temperature < 0.5);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = parse_yaml_config(
            "render:\n  scroll: false\n  screenshot: false\nextraction:\n  model: gpt-4o-mini\n",
        )
        .unwrap();

        assert!(!config.render.scroll);
        assert!(!config.render.screenshot);
        assert_eq!(config.render.settle_delay_ms, 2_000);
        assert_eq!(config.extraction.model, "gpt-4o-mini");
        assert_eq!(config.extraction.base_url, "https://api.openai.com/v1");
        assert!(config.browser.headless);
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = parse_yaml_config("{}").unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
    }
}
