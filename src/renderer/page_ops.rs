//! Page readiness, lazy-load scrolling and capture helpers

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chromiumoxide::Page;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide_cdp::cdp::browser_protocol::page::CaptureScreenshotFormat;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

const READY_STATE_JS: &str =
    "[document.readyState, performance.getEntriesByType('resource').length]";

const SCROLL_HEIGHT_JS: &str = "Math.max(\
    document.body ? document.body.scrollHeight : 0, \
    document.documentElement ? document.documentElement.scrollHeight : 0)";

/// Wait until the document is complete and no new resources have been
/// requested for `quiet`, or until `timeout` elapses.
///
/// Returns whether quiescence was reached.
pub(crate) async fn wait_for_network_idle(
    page: &Page,
    quiet: Duration,
    timeout: Duration,
) -> Result<bool, CdpError> {
    let start = Instant::now();
    let mut last_count: Option<u64> = None;
    let mut stable_since = Instant::now();

    loop {
        let (ready_state, count): (String, u64) =
            page.evaluate(READY_STATE_JS).await?.into_value()?;

        if last_count != Some(count) {
            trace!(resources = count, "Resource count changed");
            last_count = Some(count);
            stable_since = Instant::now();
        } else if ready_state == "complete" && stable_since.elapsed() >= quiet {
            debug!(
                resources = count,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Network idle"
            );
            return Ok(true);
        }

        if start.elapsed() >= timeout {
            return Ok(false);
        }

        tokio::time::sleep(IDLE_POLL_INTERVAL).await;
    }
}

/// Scroll down in fixed steps until the scrolled distance reaches the page
/// height (re-read after every step, since lazy content grows it), then
/// return to the top.
///
/// Returns the number of steps taken.
pub(crate) async fn auto_scroll(
    page: &Page,
    step_px: u32,
    poll: Duration,
    max_steps: u32,
) -> Result<u32, CdpError> {
    let mut scrolled: u64 = 0;
    let mut steps = 0;

    while steps < max_steps {
        page.evaluate(format!("window.scrollBy(0, {step_px})")).await?;
        scrolled += u64::from(step_px);
        steps += 1;

        tokio::time::sleep(poll).await;

        let height: u64 = page.evaluate(SCROLL_HEIGHT_JS).await?.into_value()?;
        if scrolled >= height {
            break;
        }
    }

    page.evaluate("window.scrollTo(0, 0)").await?;
    debug!(steps, scrolled_px = scrolled, "Auto-scroll finished");
    Ok(steps)
}

/// Full-page JPEG capture, base64-encoded for transport
pub(crate) async fn capture_full_page(page: &Page, quality: i64) -> Result<String, CdpError> {
    let params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Jpeg)
        .quality(quality)
        .full_page(true)
        .build();

    let bytes = page.screenshot(params).await?;
    debug!(size_bytes = bytes.len(), "Captured full-page screenshot");

    Ok(BASE64.encode(bytes))
}
