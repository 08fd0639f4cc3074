//! Page rendering: one isolated headless browser per URL
//!
//! Flow per URL: launch → blank page → navigate (bounded) → network idle →
//! settle delay → optional lazy-load scroll → snapshot DOM → shape →
//! optional screenshot → shutdown. The browser is torn down on every exit
//! path: explicitly after the render, or by `BrowserWrapper::drop` when the
//! future is cancelled or unwinds.

mod page_ops;

use async_trait::async_trait;
use chromiumoxide::Page;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::browser::BrowserWrapper;
use crate::events::ScrapedContent;
use crate::page_extractor::shape_page;
use crate::utils::{MAX_NAVIGATION_TIMEOUT_MS, RenderError, validate_navigation_timeout};
use crate::{BrowserConfig, Config, RenderConfig};

/// Produces shaped content (and optionally a screenshot) for a URL
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<ScrapedContent, RenderError>;
}

/// Renderer backed by a locally launched Chrome/Chromium
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    browser: BrowserConfig,
    render: RenderConfig,
    navigation_timeout: Duration,
}

impl ChromeRenderer {
    /// Build a renderer, validating the navigation timeout against its ceiling
    pub fn new(browser: BrowserConfig, render: RenderConfig) -> anyhow::Result<Self> {
        let navigation_timeout =
            validate_navigation_timeout(Some(render.navigation_timeout_ms), MAX_NAVIGATION_TIMEOUT_MS)?;

        Ok(Self {
            browser,
            render,
            navigation_timeout,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.browser.clone(), config.render.clone())
    }

    async fn render_page(&self, wrapper: &BrowserWrapper, url: &str) -> Result<ScrapedContent, RenderError> {
        let page = wrapper.new_blank_page().await?;
        let started = Instant::now();

        self.navigate(&page, url).await?;

        let remaining = self.navigation_timeout.saturating_sub(started.elapsed());
        let quiet = Duration::from_millis(self.render.network_idle_ms);
        match page_ops::wait_for_network_idle(&page, quiet, remaining).await {
            Ok(true) => {}
            Ok(false) => warn!(url = %url, "Network did not go idle before timeout, continuing"),
            Err(e) => warn!(url = %url, "Network idle check failed: {}, continuing", e),
        }

        tokio::time::sleep(Duration::from_millis(self.render.settle_delay_ms)).await;

        if self.render.scroll {
            match page_ops::auto_scroll(
                &page,
                self.render.scroll_step_px,
                Duration::from_millis(self.render.scroll_poll_ms),
                self.render.max_scroll_steps,
            )
            .await
            {
                Ok(_) => {
                    tokio::time::sleep(Duration::from_millis(self.render.post_scroll_pause_ms)).await;
                }
                Err(e) => warn!(url = %url, "Auto-scroll failed: {}, capturing as-is", e),
            }
        }

        let html = page
            .content()
            .await
            .map_err(|e| RenderError::Content(e.to_string()))?;

        // html5ever parsing of large pages is CPU-bound
        let source_url = url.to_string();
        let text = tokio::task::spawn_blocking(move || shape_page(&html, &source_url))
            .await
            .map_err(|e| RenderError::Content(format!("Shaping task failed: {}", e)))?;

        let screenshot = if self.render.screenshot {
            match page_ops::capture_full_page(&page, self.render.jpeg_quality).await {
                Ok(encoded) => Some(encoded),
                Err(e) => {
                    warn!(url = %url, "Screenshot failed: {}, continuing text-only", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(ScrapedContent { text, screenshot })
    }

    async fn navigate(&self, page: &Page, url: &str) -> Result<(), RenderError> {
        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        tokio::time::timeout(self.navigation_timeout, navigation)
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
                timeout_ms: self.navigation_timeout.as_millis(),
            })?
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<ScrapedContent, RenderError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RenderError::InvalidUrl(url.to_string()));
        }

        info!(url = %url, "Rendering page");
        let wrapper = BrowserWrapper::launch(&self.browser).await?;

        let result = self.render_page(&wrapper, url).await;

        wrapper.shutdown().await;

        if let Ok(content) = &result {
            debug!(
                url = %url,
                text_chars = content.text.chars().count(),
                screenshot = content.screenshot.is_some(),
                "Rendered page"
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_navigation_timeout_over_ceiling() {
        let render = RenderConfig {
            navigation_timeout_ms: 90_000,
            ..RenderConfig::default()
        };
        assert!(ChromeRenderer::new(BrowserConfig::default(), render).is_err());
    }

    #[tokio::test]
    async fn non_http_urls_fail_before_launching_a_browser() {
        let renderer = ChromeRenderer::from_config(&Config::default()).unwrap();

        let err = renderer.render("ftp://venue.test/").await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidUrl(_)));

        let err = renderer.render("venue.test").await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidUrl(_)));
    }
}
