//! Keyword-biased content accumulation
//!
//! Every element whose text, class or id mentions an event keyword, and whose
//! text is long enough to be more than a nav link, is appended to the
//! accumulator once per matching keyword. Nested matches repeat their
//! ancestors' text. Duplicates are kept.

use scraper::{ElementRef, Html, Selector};

use super::text::{is_skipped, structured_text, visible_text};
use crate::utils::constants::{EVENT_KEYWORDS, MIN_RELEVANT_TEXT_LEN};

struct Candidate<'a> {
    element: ElementRef<'a>,
    /// One flag per entry of `EVENT_KEYWORDS`
    matches: Vec<bool>,
}

/// Collect structured text of all event-related elements, blank-line separated
///
/// Returns an empty string when nothing qualifies.
pub fn collect_event_text(document: &Html) -> String {
    let Ok(all) = Selector::parse("*") else {
        return String::new();
    };

    let candidates: Vec<Candidate> = document
        .select(&all)
        .filter(|el| !is_skipped(el) && !inside_skipped(el))
        .filter_map(|element| {
            let text = visible_text(&element);
            if text.chars().count() <= MIN_RELEVANT_TEXT_LEN {
                return None;
            }

            let text = text.to_lowercase();
            let class = element.value().attr("class").unwrap_or_default().to_lowercase();
            let id = element.value().attr("id").unwrap_or_default().to_lowercase();

            let matches: Vec<bool> = EVENT_KEYWORDS
                .iter()
                .map(|kw| text.contains(kw) || class.contains(kw) || id.contains(kw))
                .collect();

            matches
                .iter()
                .any(|m| *m)
                .then_some(Candidate { element, matches })
        })
        .collect();

    let mut rendered: Vec<Option<String>> = vec![None; candidates.len()];
    let mut accumulator = String::new();

    for (kw_index, _) in EVENT_KEYWORDS.iter().enumerate() {
        for (idx, candidate) in candidates.iter().enumerate() {
            if !candidate.matches[kw_index] {
                continue;
            }
            let text = rendered[idx].get_or_insert_with(|| structured_text(&candidate.element));
            accumulator.push_str(text);
            accumulator.push_str("\n\n");
        }
    }

    accumulator.trim_end().to_string()
}

fn inside_skipped(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_skipped(&ancestor))
}
