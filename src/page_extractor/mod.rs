//! Content shaping for rendered pages
//!
//! Turns the browser's serialized DOM into the labeled text blob the
//! extraction prompt expects: source URL, JSON-LD, then event-biased content
//! (or the `<main>`/`<body>` text when no event-related element qualifies).
//! Pure function of the snapshot, no I/O.

mod relevance;
mod structured_data;
mod text;

pub use relevance::collect_event_text;
pub use structured_data::collect_json_ld;
pub use text::{structured_text, visible_text};

use scraper::{Html, Selector};

/// Section labels, referenced by the extraction prompt
pub const SOURCE_URL_LABEL: &str = "Source URL:";
pub const STRUCTURED_DATA_LABEL: &str = "Structured Data (JSON-LD):";
pub const PAGE_CONTENT_LABEL: &str = "Page Content:";

/// Shape a rendered HTML snapshot into labeled extraction input
pub fn shape_page(html: &str, source_url: &str) -> String {
    let document = Html::parse_document(html);

    let json_ld = collect_json_ld(&document);

    let mut content = collect_event_text(&document);
    if content.is_empty() {
        content = fallback_text(&document);
    }

    format!(
        "{SOURCE_URL_LABEL} {source_url}\n\n{STRUCTURED_DATA_LABEL}\n{json_ld}\n\n{PAGE_CONTENT_LABEL}\n{content}"
    )
}

/// Structured text of `<main>`, else `<body>`, else the whole document
fn fallback_text(document: &Html) -> String {
    for selector_str in ["main", "body"] {
        if let Ok(selector) = Selector::parse(selector_str)
            && let Some(element) = document.select(&selector).next()
        {
            return structured_text(&element);
        }
    }

    structured_text(&document.root_element())
}
