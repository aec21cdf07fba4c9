// src/ingest/dates.rs
//! Timestamp parsing for feed metadata.
//!
//! Structured fields (RSS `pubDate`, Atom/Dublin Core dates) are parsed
//! strictly; anything else goes through a lenient list of human formats.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

fn from_offset(dt: OffsetDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond())
}

pub fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .and_then(from_offset)
}

pub fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc3339)
        .ok()
        .and_then(from_offset)
}

const ZONED_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];

/// Best-effort parse of a free-text date. Values without a zone are UTC.
pub fn parse_free_text(ts: &str) -> Option<DateTime<Utc>> {
    let s = ts.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for f in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, f) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // Trailing UTC designators carry no offset information chrono can use.
    let naive = s
        .strip_suffix(" GMT")
        .or_else(|| s.strip_suffix(" UTC"))
        .or_else(|| s.strip_suffix('Z'))
        .unwrap_or(s)
        .trim();
    for f in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, f) {
            return Some(dt.and_utc());
        }
    }
    for f in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(naive, f) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// RFC 2822 (RSS `pubDate`) or RFC 3339 (Atom, Dublin Core). Used as the
/// feed parser's timestamp hook for structured fields.
pub fn parse_structured(ts: &str) -> Option<DateTime<Utc>> {
    parse_rfc2822(ts).or_else(|| parse_rfc3339(ts))
}

/// Dates found on one feed entry, by how they were obtained.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryDates {
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    /// Lenient parse of whichever date text the entry carried.
    pub free_text: Option<DateTime<Utc>>,
}

/// Where a resolved timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrigin {
    Published,
    Updated,
    FreeText,
    Synthesized,
}

/// Resolve the publication time of the `index`-th entry of a feed:
/// published → updated → free-text → `now - index * step`.
pub fn resolve_published(
    dates: EntryDates,
    now: DateTime<Utc>,
    index: usize,
    step: Duration,
) -> (DateTime<Utc>, DateOrigin) {
    if let Some(dt) = dates.published {
        return (dt, DateOrigin::Published);
    }
    if let Some(dt) = dates.updated {
        return (dt, DateOrigin::Updated);
    }
    if let Some(dt) = dates.free_text {
        return (dt, DateOrigin::FreeText);
    }
    let synthesized = i32::try_from(index)
        .ok()
        .and_then(|i| step.checked_mul(i))
        .and_then(|offset| now.checked_sub_signed(offset))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    (synthesized, DateOrigin::Synthesized)
}
