//! Batch driver: validate, then render and extract each URL in turn
//!
//! URLs run strictly one after another, so at most one browser is alive at a
//! time. A URL that fails to render contributes nothing; the batch goes on.
//! A refused API key is the exception: it ends the batch as fatal.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::dates::sort_events_by_date;
use crate::events::{Event, ScrapeRequest, UrlOutcome};
use crate::extraction::EventExtractor;
use crate::renderer::Renderer;
use crate::utils::ScrapeError;

/// Renderer and extractor wired together; cheap to clone and share
#[derive(Clone)]
pub struct Pipeline {
    renderer: Arc<dyn Renderer>,
    extractor: Arc<dyn EventExtractor>,
}

impl Pipeline {
    pub fn new(renderer: Arc<dyn Renderer>, extractor: Arc<dyn EventExtractor>) -> Self {
        Self { renderer, extractor }
    }

    /// Run one invocation
    ///
    /// Fails with [`ScrapeError::Validation`] before anything is rendered, or
    /// with [`ScrapeError::Fatal`] once the extraction service refuses the
    /// key. Other per-URL failures are logged and yield zero events.
    pub async fn run(&self, request: &ScrapeRequest) -> Result<Vec<Event>, ScrapeError> {
        let (urls, api_key) = validate(request)?;

        info!(urls = urls.len(), "Starting scrape");

        let mut outcomes = Vec::with_capacity(urls.len());
        for url in &urls {
            outcomes.push(self.process_url(url, api_key).await?);
        }

        let failed: Vec<String> = outcomes
            .iter()
            .filter(|o| o.is_failure())
            .map(|o| o.url().to_string())
            .collect();
        let mut events: Vec<Event> = outcomes
            .into_iter()
            .flat_map(UrlOutcome::into_events)
            .collect();

        sort_events_by_date(&mut events);

        info!(
            ok = urls.len() - failed.len(),
            failed = failed.len(),
            events = events.len(),
            "Scrape finished"
        );
        if !failed.is_empty() {
            warn!(urls = ?failed, "Some URLs contributed no events");
        }

        Ok(events)
    }

    /// Run one invocation under a wall-clock ceiling
    ///
    /// The run is spawned so that a panic or an exceeded ceiling becomes
    /// [`ScrapeError::Fatal`]. On timeout the task is aborted, which drops the
    /// in-flight browser and discards any partial results.
    pub async fn run_bounded(&self, request: ScrapeRequest, ceiling: Duration) -> Result<Vec<Event>, ScrapeError> {
        let pipeline = self.clone();
        let task = tokio::spawn(async move { pipeline.run(&request).await });
        let abort = task.abort_handle();

        match tokio::time::timeout(ceiling, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                error!("Scrape task failed: {}", join_error);
                Err(ScrapeError::Fatal(join_error.to_string()))
            }
            Err(_) => {
                abort.abort();
                error!(?ceiling, "Scrape exceeded invocation ceiling");
                Err(ScrapeError::Fatal(format!(
                    "invocation exceeded {:?} ceiling",
                    ceiling
                )))
            }
        }
    }

    async fn process_url(&self, url: &str, api_key: &str) -> Result<UrlOutcome, ScrapeError> {
        let outcome = match self.renderer.render(url).await {
            Ok(content) => {
                let events = self
                    .extractor
                    .extract(&content.text, content.screenshot.as_deref(), url, api_key)
                    .await
                    .map_err(|rejected| {
                        error!(url = %url, status = rejected.status, "API key rejected, aborting scrape");
                        ScrapeError::Fatal(rejected.to_string())
                    })?;
                info!(url = %url, count = events.len(), "Processed URL");
                UrlOutcome::Extracted {
                    url: url.to_string(),
                    events,
                }
            }
            Err(e) => {
                warn!(url = %url, "Skipping URL: {}", e);
                UrlOutcome::Failed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        };
        Ok(outcome)
    }
}

/// Trimmed, non-blank URLs and the trimmed key, or a validation error
fn validate(request: &ScrapeRequest) -> Result<(Vec<&str>, &str), ScrapeError> {
    let urls: Vec<&str> = request
        .urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();

    if urls.is_empty() {
        return Err(ScrapeError::Validation("Please provide at least one URL".into()));
    }

    let api_key = request.api_key.trim();
    if api_key.is_empty() {
        return Err(ScrapeError::Validation("API key is required".into()));
    }

    Ok((urls, api_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ScrapedContent;
    use crate::utils::{CredentialRejected, RenderError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Renderer for RecordingRenderer {
        async fn render(&self, url: &str) -> Result<ScrapedContent, RenderError> {
            self.calls.lock().unwrap().push(url.to_string());
            if url.contains("broken") {
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    message: "net::ERR_NAME_NOT_RESOLVED".into(),
                });
            }
            Ok(ScrapedContent {
                text: format!("content of {}", url),
                screenshot: None,
            })
        }
    }

    struct OneEventPerUrl;

    #[async_trait]
    impl EventExtractor for OneEventPerUrl {
        async fn extract(
            &self,
            _: &str,
            _: Option<&str>,
            url: &str,
            _: &str,
        ) -> Result<Vec<Event>, CredentialRejected> {
            Ok(vec![Event {
                venue: "venue.test".into(),
                event_name: format!("show at {}", url),
                date: "TBA".into(),
                time: "TBA".into(),
                price: None,
                description: None,
                url: url.to_string(),
            }])
        }
    }

    struct RefusesKey;

    #[async_trait]
    impl EventExtractor for RefusesKey {
        async fn extract(
            &self,
            _: &str,
            _: Option<&str>,
            _: &str,
            _: &str,
        ) -> Result<Vec<Event>, CredentialRejected> {
            Err(CredentialRejected {
                status: 401,
                message: "Incorrect API key provided".into(),
            })
        }
    }

    fn pipeline(renderer: Arc<RecordingRenderer>) -> Pipeline {
        Pipeline::new(renderer, Arc::new(OneEventPerUrl))
    }

    #[tokio::test]
    async fn urls_and_key_are_trimmed_and_blanks_skipped() {
        let renderer = Arc::new(RecordingRenderer::default());
        let request = ScrapeRequest::new(["  https://a.test/ ", "", "https://b.test/"], " sk-test ");

        let events = pipeline(renderer.clone()).run(&request).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(
            *renderer.calls.lock().unwrap(),
            vec!["https://a.test/", "https://b.test/"]
        );
    }

    #[tokio::test]
    async fn blank_urls_fail_validation_without_rendering() {
        let renderer = Arc::new(RecordingRenderer::default());
        let request = ScrapeRequest::new(["  ", ""], "sk-test");

        let err = pipeline(renderer.clone()).run(&request).await.unwrap_err();

        assert!(err.is_validation());
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_key_fails_validation_without_rendering() {
        let renderer = Arc::new(RecordingRenderer::default());
        let request = ScrapeRequest::new(["https://a.test/"], "   ");

        let err = pipeline(renderer.clone()).run(&request).await.unwrap_err();

        assert!(err.is_validation());
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_url_does_not_abort_the_batch() {
        let renderer = Arc::new(RecordingRenderer::default());
        let request = ScrapeRequest::new(
            ["https://a.test/", "https://broken.test/", "https://c.test/"],
            "sk-test",
        );

        let events = pipeline(renderer.clone()).run(&request).await.unwrap();

        assert_eq!(renderer.calls.lock().unwrap().len(), 3);
        let urls: Vec<&str> = events.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.test/", "https://c.test/"]);
    }

    #[tokio::test]
    async fn refused_key_is_fatal_and_stops_the_batch() {
        let renderer = Arc::new(RecordingRenderer::default());
        let pipeline = Pipeline::new(renderer.clone(), Arc::new(RefusesKey));
        let request = ScrapeRequest::new(["https://a.test/", "https://b.test/"], "sk-revoked");

        let err = pipeline.run(&request).await.unwrap_err();

        assert!(matches!(err, ScrapeError::Fatal(ref message) if message.contains("401")));
        assert_eq!(*renderer.calls.lock().unwrap(), vec!["https://a.test/"]);
    }
}
