//! Timeout validation utilities for browser operations

use std::time::Duration;

use anyhow::{Result, bail};

/// Contract ceiling for a single page navigation (30 seconds)
pub const MAX_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Validate a configured navigation timeout against the contract ceiling
///
/// # Example
/// ```ignore
/// let timeout = validate_navigation_timeout(Some(20_000), 30_000)?;
/// ```
pub fn validate_navigation_timeout(
    timeout_ms: Option<u64>,
    default_ms: u64,
) -> Result<Duration> {
    let ms = timeout_ms.unwrap_or(default_ms);

    if ms == 0 {
        bail!("Navigation timeout must be greater than zero");
    }

    if ms > MAX_NAVIGATION_TIMEOUT_MS {
        bail!(
            "Navigation timeout cannot exceed {}ms ({} seconds). Received: {}ms ({:.1} seconds)",
            MAX_NAVIGATION_TIMEOUT_MS,
            MAX_NAVIGATION_TIMEOUT_MS / 1000,
            ms,
            ms as f64 / 1000.0
        );
    }

    Ok(Duration::from_millis(ms))
}
