//! Per-render browser lifecycle
//!
//! Every URL gets its own Chrome process and profile directory. The wrapper
//! owns both and tears them down on `shutdown()` or, as a fallback, on drop.

use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserResult};
use crate::BrowserConfig;
use crate::browser_setup::launch_browser;

/// One isolated browser: process, CDP handler task, profile directory
///
/// The handler task must be aborted once the browser is gone or it keeps
/// polling a dead connection.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    profile_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    /// Launch an isolated browser with a fresh profile directory
    pub async fn launch(config: &BrowserConfig) -> BrowserResult<Self> {
        let profile_dir = std::env::temp_dir().join(format!(
            "gig_scout_chrome_{}_{}",
            std::process::id(),
            uuid::Uuid::new_v4().simple()
        ));

        debug!("Launching isolated browser, profile {}", profile_dir.display());

        let (browser, handler) = launch_browser(config, profile_dir.clone())
            .await
            .map_err(|e| BrowserError::LaunchFailed(format!("{e:#}")))?;

        Ok(Self {
            browser,
            handler,
            profile_dir: Some(profile_dir),
        })
    }

    /// Open a blank page; navigation happens afterwards so the user agent and
    /// viewport are already in effect for the first request.
    pub async fn new_blank_page(&self) -> BrowserResult<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))
    }

    /// Close the browser, wait for the process to exit, remove the profile
    ///
    /// `close()` alone leaves a zombie Chrome process; `wait()` reaps it.
    /// Teardown never fails the caller.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }

        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }

        self.handler.abort();
        self.remove_profile_dir();
    }

    /// Must run after the process has exited; Windows keeps profile files
    /// locked until then.
    fn remove_profile_dir(&mut self) {
        let Some(path) = self.profile_dir.take() else {
            return;
        };

        match std::fs::remove_dir_all(&path) {
            Ok(()) => debug!("Removed profile directory {}", path.display()),
            Err(e) => warn!("Failed to remove profile directory {}: {}", path.display(), e),
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();

        // Reached without shutdown() when the render future is cancelled,
        // e.g. by the invocation ceiling. Browser::drop kills the process.
        if self.profile_dir.is_some() {
            info!("Browser dropped without shutdown, removing profile directory");
            self.remove_profile_dir();
        }
    }
}
