//! Best-effort parsing of the free-form `date` strings models return
//!
//! Used only for ordering. A string that cannot be parsed is never an error;
//! it just keeps its place in the result list.

use chrono::{Datelike, Local, NaiveDate};

use crate::events::Event;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parse an event date, filling a missing year with the current one
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    parse_event_date_in(raw, Local::now().year())
}

/// Parse an event date, filling a missing year with `default_year`
///
/// Accepts `2025-03-15` (optionally followed by a time), `03/15/2025`, and
/// month-name forms in either order with optional weekday, ordinal suffix
/// and year: `Saturday, March 15, 2025`, `Mar 15th`, `15 March 2025`.
pub fn parse_event_date_in(raw: &str, default_year: i32) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(prefix) = raw.get(..10)
        && let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return Some(date);
    }

    parse_month_name_form(raw, default_year)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Month(u32),
    Day(u32),
    Year(i32),
    Other,
}

fn classify(token: &str) -> Token {
    let lower = token.to_ascii_lowercase();
    if let Some(m) = month_number(&lower) {
        return Token::Month(m);
    }

    let digits = strip_ordinal(&lower);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Token::Other;
    }

    match (digits.len(), digits.parse::<u32>()) {
        (1 | 2, Ok(d)) if (1..=31).contains(&d) => Token::Day(d),
        (4, Ok(y)) => i32::try_from(y).map(Token::Year).unwrap_or(Token::Other),
        _ => Token::Other,
    }
}

/// The day must sit right after the month (`March 20`) or right before it
/// (`20 March`); stray numbers such as times elsewhere are ignored.
fn parse_month_name_form(raw: &str, default_year: i32) -> Option<NaiveDate> {
    let tokens: Vec<Token> = raw
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '-' | '/'))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(classify)
        .collect();

    let (at, month) = tokens.iter().enumerate().find_map(|(i, t)| match t {
        Token::Month(m) => Some((i, *m)),
        _ => None,
    })?;

    let day_at = |i: Option<usize>| match i.and_then(|i| tokens.get(i)) {
        Some(Token::Day(d)) => Some(*d),
        _ => None,
    };
    let day = day_at(at.checked_add(1)).or_else(|| day_at(at.checked_sub(1)))?;

    let year = tokens
        .iter()
        .find_map(|t| match t {
            Token::Year(y) => Some(*y),
            _ => None,
        })
        .unwrap_or(default_year);

    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(token: &str) -> Option<u32> {
    if token.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| name.starts_with(token))
        .and_then(|i| u32::try_from(i + 1).ok())
}

fn strip_ordinal(token: &str) -> &str {
    ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .unwrap_or(token)
}

/// Order events by parsed date using the current year for year-less dates
pub fn sort_events_by_date(events: &mut Vec<Event>) {
    sort_events_by_date_in(events, Local::now().year());
}

/// Stable date ordering that leaves unparseable events in place
///
/// Events with a parseable date are sorted among the positions that
/// parseable events occupy; every other event keeps its index.
pub fn sort_events_by_date_in(events: &mut Vec<Event>, default_year: i32) {
    let mut dated: Vec<(usize, NaiveDate)> = events
        .iter()
        .enumerate()
        .filter_map(|(i, e)| parse_event_date_in(&e.date, default_year).map(|d| (i, d)))
        .collect();

    if dated.len() < 2 {
        return;
    }

    let slots: Vec<usize> = dated.iter().map(|(i, _)| *i).collect();
    dated.sort_by_key(|(_, date)| *date);

    let mut order: Vec<usize> = (0..events.len()).collect();
    for (slot, (source, _)) in slots.iter().zip(&dated) {
        order[*slot] = *source;
    }

    let mut taken: Vec<Option<Event>> = std::mem::take(events).into_iter().map(Some).collect();
    *events = order.into_iter().filter_map(|i| taken[i].take()).collect();
}
