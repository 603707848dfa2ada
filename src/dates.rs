//! # Dates
//!
//! Feed producers disagree on date formats. RSS asks for RFC 2822, Atom uses
//! RFC 3339, and plenty of feeds ship something in between. Everything is
//! rendered in one canonical wire format (RFC 2822 in UTC,
//! `Wed, 02 Oct 2024 10:00:00 +0000`).
//!
//! Fallbacks are best-effort and never raise:
//! - [`to_canonical`] returns `None` for blank or unparseable input;
//!   [`normalize_published`] turns that into the run's frozen `now`.
//! - [`to_instant`] maps a canonical-looking string that still fails to parse
//!   to the Unix epoch, so it sorts oldest.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

/// chrono format string of the canonical wire format.
pub const CANONICAL_FORMAT: &str = "%a, %d %b %Y %H:%M:%S +0000";

fn re_tz_abbrev() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\b(GMT|UTC|UT|[ECMP][SD]T)\b").unwrap())
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Render an instant in the canonical wire format.
pub fn format_canonical(dt: &DateTime<Utc>) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// Heuristic: contains a comma and either a zone abbreviation or an offset sign.
fn looks_canonical(s: &str) -> bool {
    s.contains(',') && (re_tz_abbrev().is_match(s) || s.contains('+') || s.contains('-'))
}

fn parse_extended(s: &str) -> Option<DateTime<Utc>> {
    let s = match s.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => s.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    // Naive values are assumed to be UTC.
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Convert a raw feed date into the canonical wire format.
///
/// Canonical-looking input is passed through unchanged (not re-validated).
/// Anything else is parsed as an ISO-8601 / RFC 3339 style timestamp and
/// normalized to UTC.
pub fn to_canonical(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if looks_canonical(s) {
        return Some(s.to_string());
    }
    parse_extended(s).map(|dt| format_canonical(&dt))
}

/// Parse a canonical wire-format string back into an instant for sorting.
/// Failure yields the Unix epoch.
pub fn to_instant(canonical: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc2822(canonical.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Canonical string plus sortable instant for a raw date, falling back to `now`
/// when the raw value is blank or unparseable.
pub fn normalize_published(raw: &str, now: DateTime<Utc>) -> (String, DateTime<Utc>) {
    match to_canonical(raw) {
        Some(canonical) => {
            let instant = to_instant(&canonical);
            (canonical, instant)
        }
        None => (format_canonical(&now), now),
    }
}
