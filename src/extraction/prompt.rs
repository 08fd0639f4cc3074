//! Extraction contract sent to the model

use chrono::NaiveDate;

use crate::page_extractor::{PAGE_CONTENT_LABEL, STRUCTURED_DATA_LABEL};

/// System instruction: field set, inclusion policy, reply shape
pub fn system_prompt(today: NaiveDate) -> String {
    format!(
        r#"You extract upcoming live music events from venue websites.

Today's date is {today}.

For every event listed, return an object with these fields:
- "venue": the venue name (omit if the page does not name it)
- "eventName": the performer(s) or event title
- "date": the event date as written, including the year (e.g. "Saturday, March 15, 2025")
- "time": the start or door time as written (omit if not listed)
- "price": ticket price as written (omit if not listed)
- "description": one short sentence about the event (omit if nothing useful)
- "url": the link to this specific event's page (omit if there is none)

Rules:
- Only include events on or after today ({today}). Skip past events.
- If a date omits the year, infer the current or next year from context so the date is not in the past.
- Use the "{STRUCTURED_DATA_LABEL}" section when present; it is often the most accurate source.
- The "{PAGE_CONTENT_LABEL}" section may repeat the same listing several times; report each event once.
- If a screenshot is attached, read listings rendered visually (calendars, flyers) as well.
- Do not invent events or fields.

Respond with a single JSON object of the form {{"events": [ ... ]}}. Return {{"events": []}} if there are none."#
    )
}

/// User message text: shaped content plus the page it came from
pub fn user_prompt(content: &str, source_url: &str) -> String {
    format!("Extract the upcoming events from this venue page ({source_url}).\n\n{content}")
}
