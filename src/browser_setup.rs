//! Chrome/Chromium discovery and launch
//!
//! Resolves a browser executable (override, well-known install locations,
//! `PATH`, then a managed download) and launches it with a desktop user
//! agent, a fixed viewport, and flags that keep automation quiet.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Handler;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::BrowserConfig;
use crate::utils::constants::CHROME_USER_AGENT;

/// Environment variable naming an explicit browser executable
pub const CHROME_PATH_ENV: &str = "CHROMIUM_PATH";

#[cfg(target_os = "macos")]
const INSTALL_LOCATIONS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/homebrew/bin/chromium",
];

#[cfg(target_os = "windows")]
const INSTALL_LOCATIONS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Chromium\Application\chrome.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const INSTALL_LOCATIONS: &[&str] = &[
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/opt/google/chrome/chrome",
];

/// Executable names searched on `PATH`
const PATH_NAMES: &[&str] = &[
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Flags applied to every launch
const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-features=TranslateUI",
    "--disable-hang-monitor",
    "--disable-prompt-on-repost",
    "--disable-software-rasterizer",
    "--no-first-run",
    "--no-default-browser-check",
    "--password-store=basic",
    "--use-mock-keychain",
    "--hide-scrollbars",
    "--mute-audio",
];

/// Creates a profile directory and removes it again unless disarmed
struct ProfileDirGuard {
    path: PathBuf,
    armed: bool,
}

impl ProfileDirGuard {
    fn create(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create profile directory {}", path.display()))?;
        Ok(Self { path, armed: true })
    }

    /// Hand ownership of the directory to the caller
    fn disarm(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ProfileDirGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Removed profile directory after failed launch"),
            Err(e) => warn!("Failed to remove profile directory {}: {}", self.path.display(), e),
        }
    }
}

/// Locate an installed Chrome/Chromium
pub fn find_browser_executable() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CHROME_PATH_ENV).map(PathBuf::from) {
        if path.is_file() {
            info!("Using browser from {}: {}", CHROME_PATH_ENV, path.display());
            return Some(path);
        }
        warn!("{} points to a missing file: {}", CHROME_PATH_ENV, path.display());
    }

    if let Some(path) = INSTALL_LOCATIONS.iter().map(Path::new).find(|p| p.is_file()) {
        info!("Found browser at {}", path.display());
        return Some(path.to_path_buf());
    }

    let search_path = std::env::var_os("PATH")?;
    let found = search_on_path(&search_path, PATH_NAMES);
    if let Some(path) = &found {
        info!("Found browser on PATH: {}", path.display());
    }
    found
}

/// First `dir/name` that exists, in `PATH` order then name order
fn search_on_path(search_path: &std::ffi::OsStr, names: &[&str]) -> Option<PathBuf> {
    std::env::split_paths(search_path).find_map(|dir| {
        names
            .iter()
            .flat_map(|name| {
                [dir.join(name), dir.join(format!("{name}.exe"))]
            })
            .find(|candidate| candidate.is_file())
    })
}

/// Download Chromium into the user cache directory and return its executable
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gig-scout")
        .join("chromium");

    info!("No local browser found, downloading Chromium into {}", cache_dir.display());

    std::fs::create_dir_all(&cache_dir).context("Failed to create browser cache directory")?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&cache_dir)
        .build()
        .context("Failed to build fetcher options")?;
    let revision = BrowserFetcher::new(options)
        .fetch()
        .await
        .context("Failed to download Chromium")?;

    Ok(revision.executable_path)
}

/// Launch a browser using `user_data_dir` as its private profile
///
/// The directory is created here and removed again if the launch fails.
/// On success the caller owns it.
pub async fn launch_browser(
    config: &BrowserConfig,
    user_data_dir: PathBuf,
) -> Result<(Browser, JoinHandle<()>)> {
    let executable = match find_browser_executable() {
        Some(path) => path,
        None => download_managed_browser().await?,
    };

    let profile = ProfileDirGuard::create(user_data_dir)?;

    let (width, height) = (config.window.width, config.window.height);
    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(width, height)
        .viewport(Viewport {
            width,
            height,
            ..Viewport::default()
        })
        .user_data_dir(profile.path.clone())
        .chrome_executable(executable)
        .arg(format!("--user-agent={}", CHROME_USER_AGENT));

    builder = if config.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    for arg in LAUNCH_ARGS {
        builder = builder.arg(*arg);
    }

    if config.disable_security {
        warn!("Launching with web security disabled");
        builder = builder
            .arg("--disable-web-security")
            .arg("--ignore-certificate-errors");
    }

    // setuid sandbox does not work inside containers
    if config.disable_security || running_in_container() {
        builder = builder.arg("--no-sandbox").arg("--disable-setuid-sandbox");
    }

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid browser configuration: {e}"))?;

    let (browser, handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = spawn_handler(handler);
    profile.disarm();

    Ok((browser, handler_task))
}

/// Drive the CDP connection until the browser goes away
fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    task::spawn(async move {
        while let Some(event) = handler.next().await {
            let Err(e) = event else { continue };
            let message = e.to_string();

            // chromiumoxide cannot deserialize every CDP event newer Chrome emits
            if is_benign_cdp_error(&message) {
                trace!("Ignoring undecodable CDP message: {}", message);
            } else {
                error!("Browser handler error: {:?}", e);
            }
        }
        debug!("Browser handler finished");
    })
}

fn is_benign_cdp_error(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

fn running_in_container() -> bool {
    Path::new("/.dockerenv").exists()
        || std::env::var_os("container").is_some()
        || std::env::var_os("KUBERNETES_SERVICE_HOST").is_some()
}
