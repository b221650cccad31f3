use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde_json::{Number, Value};
use std::borrow::Cow;

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Magnitudes above which a numeric epoch is read as nanoseconds,
/// microseconds and milliseconds respectively.
const NANOS_THRESHOLD: i128 = 1_000_000_000_000_000_000;
const MICROS_THRESHOLD: i128 = 1_000_000_000_000_000;
const MILLIS_THRESHOLD: i128 = 1_000_000_000_000;

/// Where a zone abbreviation (`MST`, `GMT`, ...) sits in a layout.
#[derive(Debug, Clone, Copy)]
enum Zone {
    None,
    /// Last whitespace-separated token.
    Trailing,
    /// Token right before the trailing year.
    BeforeYear,
}

/// Leading weekday name. Only its spelling is checked; the date decides the
/// actual day.
#[derive(Debug, Clone, Copy)]
enum Weekday {
    None,
    Short,
    Long,
}

const SHORT_WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const LONG_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Which calendar components a layout carries.
#[derive(Debug, Clone, Copy)]
enum Span {
    Full,
    /// Month, day and time; the year resolves to 0.
    NoYear,
    /// Time of day only; the date resolves to 0000-01-01.
    Clock,
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    Rfc3339,
    Pattern {
        format: &'static str,
        weekday: Weekday,
        zone: Zone,
        span: Span,
    },
}

const fn pattern(format: &'static str, zone: Zone, span: Span) -> Layout {
    Layout::Pattern {
        format,
        weekday: Weekday::None,
        zone,
        span,
    }
}

/// Layout whose text starts with a weekday name; `format` covers the rest.
const fn dated(weekday: Weekday, format: &'static str, zone: Zone) -> Layout {
    Layout::Pattern {
        format,
        weekday,
        zone,
        span: Span::Full,
    }
}

/// Tried in order, first full match wins. `%.f` accepts an optional fraction,
/// so one entry covers every sub-second precision of the same layout.
const LAYOUTS: &[Layout] = &[
    // 2006-01-02 15:04:05.999999999 -0700 MST
    pattern("%Y-%m-%d %H:%M:%S%.f %z", Zone::Trailing, Span::Full),
    pattern("%Y-%m-%d %H:%M:%S%.f", Zone::None, Span::Full),
    pattern("%Y-%m-%dT%H:%M:%S%.f%z", Zone::None, Span::Full),
    Layout::Rfc3339,
    // RFC 822, RFC 822 with numeric zone
    pattern("%d %b %y %H:%M", Zone::Trailing, Span::Full),
    pattern("%d %b %y %H:%M %z", Zone::None, Span::Full),
    // RFC 850
    dated(Weekday::Long, ", %d-%b-%y %H:%M:%S%.f", Zone::Trailing),
    // RFC 1123, RFC 1123 with numeric zone
    dated(Weekday::Short, ", %d %b %Y %H:%M:%S%.f", Zone::Trailing),
    dated(Weekday::Short, ", %d %b %Y %H:%M:%S%.f %z", Zone::None),
    // Unix date, Ruby date, ANSI C
    dated(Weekday::Short, " %b %e %H:%M:%S%.f %Y", Zone::BeforeYear),
    dated(Weekday::Short, " %b %d %H:%M:%S%.f %z %Y", Zone::None),
    dated(Weekday::Short, " %b %e %H:%M:%S%.f %Y", Zone::None),
    // Kitchen
    pattern("%I:%M%p", Zone::None, Span::Clock),
    // Stamp, with milli/micro/nano variants
    pattern("%b %e %H:%M:%S%.f", Zone::None, Span::NoYear),
    pattern("%Y/%m/%d %H:%M:%S%.f", Zone::None, Span::Full),
];

/// Resolves a JSON value into an instant: strings are matched against the
/// known layouts, numbers are read as an epoch whose unit is inferred from
/// the magnitude. Every other type is rejected.
pub fn resolve_time(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => from_epoch(epoch_value(n)),
        _ => None,
    }
}

fn parse_str(input: &str) -> Option<DateTime<FixedOffset>> {
    LAYOUTS.iter().find_map(|layout| layout.parse(input))
}

impl Layout {
    fn parse(&self, input: &str) -> Option<DateTime<FixedOffset>> {
        let (format, weekday, zone, span) = match *self {
            Layout::Rfc3339 => return parse_rfc3339(input),
            Layout::Pattern {
                format,
                weekday,
                zone,
                span,
            } => (format, weekday, zone, span),
        };
        let text = strip_weekday(input, weekday)?;
        let text = strip_zone_abbrev(text, zone)?;

        match span {
            Span::Full if format.contains("%z") => DateTime::parse_from_str(&text, format).ok(),
            Span::Full => NaiveDateTime::parse_from_str(&text, format)
                .ok()
                .map(|naive| naive.and_utc().fixed_offset()),
            Span::NoYear => {
                NaiveDateTime::parse_from_str(&format!("0000 {text}"), &format!("%Y {format}"))
                    .ok()
                    .map(|naive| naive.and_utc().fixed_offset())
            }
            Span::Clock => {
                let time = NaiveTime::parse_from_str(&text, format).ok()?;
                let date = NaiveDate::from_ymd_opt(0, 1, 1)?;
                Some(date.and_time(time).and_utc().fixed_offset())
            }
        }
    }
}

/// Only the upper-case `T` separator is accepted between date and time.
fn parse_rfc3339(input: &str) -> Option<DateTime<FixedOffset>> {
    if input.as_bytes().get(10) != Some(&b'T') {
        return None;
    }
    DateTime::parse_from_rfc3339(input).ok()
}

/// Drops a leading weekday name, matched case-insensitively.
fn strip_weekday(input: &str, weekday: Weekday) -> Option<&str> {
    let names: &[&str] = match weekday {
        Weekday::None => return Some(input),
        Weekday::Short => &SHORT_WEEKDAYS,
        Weekday::Long => &LONG_WEEKDAYS,
    };
    let end = input
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    let (name, rest) = input.split_at(end);
    names
        .iter()
        .any(|n| n.eq_ignore_ascii_case(name))
        .then_some(rest)
}

/// Drops the zone abbreviation so the remainder can be parsed at offset zero.
fn strip_zone_abbrev(input: &str, zone: Zone) -> Option<Cow<'_, str>> {
    match zone {
        Zone::None => Some(Cow::Borrowed(input)),
        Zone::Trailing => {
            let (head, abbrev) = input.rsplit_once(' ')?;
            is_zone_abbrev(abbrev).then_some(Cow::Borrowed(head))
        }
        Zone::BeforeYear => {
            let (rest, year) = input.rsplit_once(' ')?;
            let (head, abbrev) = rest.rsplit_once(' ')?;
            is_zone_abbrev(abbrev).then(|| Cow::Owned(format!("{head} {year}")))
        }
    }
}

fn is_zone_abbrev(token: &str) -> bool {
    (3..=5).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_uppercase())
}

/// Integer view of a JSON number; floats are truncated toward zero.
fn epoch_value(n: &Number) -> i128 {
    if let Some(v) = n.as_i64() {
        v.into()
    } else if let Some(v) = n.as_u64() {
        v.into()
    } else {
        n.as_f64().map_or(0, |f| f as i128)
    }
}

fn from_epoch(v: i128) -> Option<DateTime<FixedOffset>> {
    let nanos = if v > NANOS_THRESHOLD {
        v
    } else if v > MICROS_THRESHOLD {
        v * 1_000
    } else if v > MILLIS_THRESHOLD {
        v * 1_000_000
    } else {
        let secs = i64::try_from(v).ok()?;
        return Local.timestamp_opt(secs, 0).single().map(|t| t.fixed_offset());
    };

    let secs = i64::try_from(nanos.div_euclid(NANOS_PER_SEC)).ok()?;
    let subsec = u32::try_from(nanos.rem_euclid(NANOS_PER_SEC)).ok()?;
    Local
        .timestamp_opt(secs, subsec)
        .single()
        .map(|t| t.fixed_offset())
}
