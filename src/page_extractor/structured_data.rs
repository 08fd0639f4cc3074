//! Embedded linked-data (JSON-LD) collection

use scraper::{Html, Selector};

/// Concatenate every `application/ld+json` script body, verbatim
///
/// Venue sites built on event plugins often publish schema.org `Event`
/// records here even when the visible calendar is rendered as an image.
pub fn collect_json_ld(document: &Html) -> String {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|script| script.text().collect::<String>())
        .map(|body| body.trim().to_string())
        .filter(|body| !body.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
