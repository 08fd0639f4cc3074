//! Untrusted model payload and its mapping onto `Event`
//!
//! The model's JSON is loosely shaped: fields may be missing, aliased
//! (`name`/`title` for `eventName`), blank, or numbers instead of strings.
//! `RawEvent` absorbs all of that; `normalize` is the only way out.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::events::{Event, TBA, UNKNOWN_EVENT};
use crate::utils::{ExtractionError, strip_code_fences};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub venue: Option<String>,
    #[serde(default, alias = "event_name", deserialize_with = "lenient_string")]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

/// Strings pass through, scalars are stringified, blanks and anything else
/// become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => return Ok(None),
    };

    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Parse the model's reply into raw events
///
/// The list is read from `events`, else `data`; anything else yields no
/// events. Entries that are not objects, or that fail to decode (e.g. a
/// key given twice), are dropped without affecting the rest.
pub fn parse_reply(reply: &str) -> Result<Vec<RawEvent>, ExtractionError> {
    let value: Value = serde_json::from_str(strip_code_fences(reply))?;

    let items = ["events", "data"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default();

    let mut events = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_object() {
            debug!("Skipping non-object event entry: {}", item);
            continue;
        }
        match serde_json::from_value::<RawEvent>(item) {
            Ok(raw) => events.push(raw),
            Err(e) => debug!("Skipping undecodable event entry: {}", e),
        }
    }

    Ok(events)
}

/// Map a raw event onto the trusted `Event`, applying defaults
pub fn normalize(raw: RawEvent, source_url: &str) -> Event {
    Event {
        venue: raw.venue.unwrap_or_else(|| venue_from_url(source_url)),
        event_name: raw
            .event_name
            .or(raw.name)
            .or(raw.title)
            .unwrap_or_else(|| UNKNOWN_EVENT.to_string()),
        date: raw.date.unwrap_or_else(|| TBA.to_string()),
        time: raw.time.unwrap_or_else(|| TBA.to_string()),
        price: raw.price,
        description: raw.description,
        url: raw
            .url
            .map(|link| resolve_link(&link, source_url))
            .unwrap_or_else(|| source_url.to_string()),
    }
}

/// Hostname of the source page with a leading `www.` removed
///
/// Falls back to the raw source string when it is not a valid URL.
pub fn venue_from_url(source_url: &str) -> String {
    Url::parse(source_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .map(|host| host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
        .unwrap_or_else(|| source_url.to_string())
}

/// Resolve relative event links against the page they came from
fn resolve_link(link: &str, source_url: &str) -> String {
    if Url::parse(link).is_ok() {
        return link.to_string();
    }

    Url::parse(source_url)
        .and_then(|base| base.join(link))
        .map(String::from)
        .unwrap_or_else(|_| link.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "https://www.bluenote.net/newyork/";

    fn normalize_json(json: &str) -> Event {
        let raw: RawEvent = serde_json::from_str(json).unwrap();
        normalize(raw, SOURCE)
    }

    #[test]
    fn empty_object_gets_every_default() {
        let event = normalize_json("{}");
        assert_eq!(event.venue, "bluenote.net");
        assert_eq!(event.event_name, "Unknown Event");
        assert_eq!(event.date, "TBA");
        assert_eq!(event.time, "TBA");
        assert_eq!(event.url, SOURCE);
        assert_eq!(event.price, None);
        assert_eq!(event.description, None);
    }

    #[test]
    fn event_name_falls_back_through_aliases() {
        assert_eq!(normalize_json(r#"{"name":"Band X","title":"T"}"#).event_name, "Band X");
        assert_eq!(normalize_json(r#"{"title":"Band Y"}"#).event_name, "Band Y");
        assert_eq!(
            normalize_json(r#"{"eventName":"Band Z","name":"ignored"}"#).event_name,
            "Band Z"
        );
        assert_eq!(normalize_json(r#"{"event_name":"Band W"}"#).event_name, "Band W");
    }

    #[test]
    fn blank_and_null_fields_count_as_missing() {
        let event = normalize_json(r#"{"venue":"  ","date":null,"eventName":""}"#);
        assert_eq!(event.venue, "bluenote.net");
        assert_eq!(event.date, "TBA");
        assert_eq!(event.event_name, "Unknown Event");
    }

    #[test]
    fn numeric_fields_are_stringified() {
        let event = normalize_json(r#"{"eventName":"Band X","price":20}"#);
        assert_eq!(event.price.as_deref(), Some("20"));
    }

    #[test]
    fn relative_links_resolve_against_source() {
        let event = normalize_json(r#"{"url":"/events/band-x"}"#);
        assert_eq!(event.url, "https://www.bluenote.net/events/band-x");

        let event = normalize_json(r#"{"url":"https://tickets.test/band-x"}"#);
        assert_eq!(event.url, "https://tickets.test/band-x");
    }

    #[test]
    fn venue_hostname_strips_only_leading_www() {
        assert_eq!(venue_from_url("https://www.bluenote.net/newyork/"), "bluenote.net");
        assert_eq!(venue_from_url("https://shows.www-venue.test/"), "shows.www-venue.test");
        assert_eq!(venue_from_url("not a url"), "not a url");
    }

    #[test]
    fn reply_reads_events_then_data() {
        let events = parse_reply(r#"{"events":[{"eventName":"A"},{"eventName":"B"}]}"#).unwrap();
        assert_eq!(events.len(), 2);

        let events = parse_reply(r#"{"data":[{"title":"C"}]}"#).unwrap();
        assert_eq!(events[0].title.as_deref(), Some("C"));

        let events = parse_reply(r#"{"events":null,"data":[{"title":"D"}]}"#).unwrap();
        assert_eq!(events.len(), 1);

        assert!(parse_reply(r#"{"results":[{"title":"E"}]}"#).unwrap().is_empty());
    }

    #[test]
    fn reply_in_code_fence_is_accepted() {
        let events = parse_reply("```json\n{\"events\":[{\"eventName\":\"A\"}]}\n```").unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn non_object_entries_are_dropped() {
        let events = parse_reply(r#"{"events":["Band X", {"eventName":"Band Y"}, 3]}"#).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name.as_deref(), Some("Band Y"));
    }

    #[test]
    fn undecodable_entry_does_not_drop_its_neighbours() {
        let events = parse_reply(
            r#"{"events":[{"eventName":"Good Show","date":"2026-11-01"},{"eventName":"Band X","event_name":"Band X"}]}"#,
        )
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name.as_deref(), Some("Good Show"));
        assert_eq!(events[0].date.as_deref(), Some("2026-11-01"));
    }

    #[test]
    fn malformed_reply_is_a_parse_error() {
        let err = parse_reply("Sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }
}
