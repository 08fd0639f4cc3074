//! Request and result records shared by every pipeline stage

use serde::{Deserialize, Serialize};

/// Placeholder used when the model returns an event without any name field
pub const UNKNOWN_EVENT: &str = "Unknown Event";

/// Placeholder used when the model omits a date or time
pub const TBA: &str = "TBA";

/// One upcoming event, normalized from an extraction reply
///
/// `venue`, `event_name`, `date`, `time` and `url` are always populated.
/// `date` and `time` are free-form and may not be parseable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub venue: String,
    pub event_name: String,
    pub date: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
}

/// Input to a single pipeline invocation
///
/// Missing keys deserialize to empty values so that validation, not the JSON
/// layer, decides what is acceptable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub urls: Vec<String>,

    #[serde(default, rename = "apiKey")]
    pub api_key: String,
}

impl ScrapeRequest {
    pub fn new(urls: impl IntoIterator<Item = impl Into<String>>, api_key: impl Into<String>) -> Self {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            api_key: api_key.into(),
        }
    }
}

/// Rendered, shaped page content for one URL
///
/// Lives only for the duration of one extraction call.
#[derive(Debug, Clone, Default)]
pub struct ScrapedContent {
    /// Shaped text (source URL, structured data, page content sections)
    pub text: String,
    /// Base64-encoded JPEG of the full page, when capture is enabled
    pub screenshot: Option<String>,
}

/// Per-URL result collected by the orchestrator
#[derive(Debug, Clone)]
pub enum UrlOutcome {
    Extracted { url: String, events: Vec<Event> },
    Failed { url: String, reason: String },
}

impl UrlOutcome {
    pub fn url(&self) -> &str {
        match self {
            UrlOutcome::Extracted { url, .. } | UrlOutcome::Failed { url, .. } => url,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UrlOutcome::Failed { .. })
    }

    /// Events contributed by this URL (empty on failure)
    pub fn into_events(self) -> Vec<Event> {
        match self {
            UrlOutcome::Extracted { events, .. } => events,
            UrlOutcome::Failed { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_camel_case_and_omits_absent_optionals() {
        let event = Event {
            venue: "bluenote.net".into(),
            event_name: "Late Set".into(),
            date: "March 15".into(),
            time: TBA.into(),
            price: None,
            description: None,
            url: "https://www.bluenote.net/newyork/".into(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["eventName"], "Late Set");
        assert!(value.get("price").is_none());
        assert!(value.get("description").is_none());
    }

    #[test]
    fn request_with_missing_keys_deserializes_empty() {
        let request: ScrapeRequest = serde_json::from_str("{}").unwrap();
        assert!(request.urls.is_empty());
        assert!(request.api_key.is_empty());

        let request: ScrapeRequest =
            serde_json::from_str(r#"{"urls":["https://a.test/"],"apiKey":"k"}"#).unwrap();
        assert_eq!(request.urls, vec!["https://a.test/"]);
        assert_eq!(request.api_key, "k");
    }

    #[test]
    fn failed_outcome_contributes_nothing() {
        let outcome = UrlOutcome::Failed {
            url: "https://a.test/".into(),
            reason: "timeout".into(),
        };
        assert!(outcome.is_failure());
        assert_eq!(outcome.url(), "https://a.test/");
        assert!(outcome.into_events().is_empty());
    }
}
