//! Shared configuration constants for rendering and extraction
//!
//! Default values used throughout the codebase, kept in one place to avoid
//! magic numbers.

/// Chrome user agent string for stealth mode
///
/// Desktop Windows build so venue sites serve their full layout rather than a
/// mobile or simplified one.
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Fixed desktop viewport
pub const VIEWPORT_WIDTH: u32 = 1920;
pub const VIEWPORT_HEIGHT: u32 = 1080;

/// Keywords that mark an element as event-related (matched case-insensitively)
pub const EVENT_KEYWORDS: &[&str] = &[
    "events",
    "calendar",
    "shows",
    "concerts",
    "schedule",
    "upcoming",
    "performances",
    "gigs",
];

/// Minimum text length for a keyword-matching element to be accumulated
pub const MIN_RELEVANT_TEXT_LEN: usize = 50;

/// Default extraction model (must accept image inputs)
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default OpenAI-compatible API base URL
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";
