//! Strict calendar-format detection and read-time date formatting
//!
//! A string field only becomes a date field if it matches one of the
//! ISO 8601 family formats exactly: full timestamps (with or without
//! fractional seconds and offset), date-only, year/year-month, week dates
//! and ordinal dates. Formatting uses moment-style tokens (`YYYY`, `MM`,
//! `DD`, ...) so stored format strings from existing content keep working.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

const OFFSET_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H%M%S%.f%:z",
    "%Y-%m-%dT%H%M%S%:z",
    "%Y-%m-%dT%H%M%:z",
];

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H%M%S%.f",
    "%Y-%m-%dT%H%M%S",
    "%Y-%m-%dT%H%M",
];

const NAIVE_DATE_FORMATS: [&str; 1] = ["%Y-%m-%d"];

/// Whether a string matches one of the supported calendar formats exactly
pub fn is_iso8601(s: &str) -> bool {
    parse(s).is_some()
}

/// Parse a supported calendar string to a UTC instant.
///
/// Date-only forms resolve to midnight UTC; timestamps without an offset
/// are taken as UTC.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    // Bare trailing Z means UTC; otherwise the timestamp is naive UTC.
    let naive = s.strip_suffix('Z').unwrap_or(s);
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return midnight(d);
        }
    }
    parse_hour_only(s)
        .or_else(|| parse_compact(s))
        .or_else(|| parse_partial(s))
        .or_else(|| parse_week_date(s))
}

/// `YYYY-MM-DDTHH`, optionally followed by `Z` or a numeric offset.
///
/// Kept out of the format tables: chrono rejects a time format with no
/// minutes field, so the hour is expanded to `HH:00` and re-parsed.
fn parse_hour_only(s: &str) -> Option<DateTime<Utc>> {
    let (date_part, time_part) = s.split_once('T')?;
    let hour = time_part.get(0..2)?;
    if !hour.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let rest = &time_part[2..];
    if !rest.is_empty() && !rest.starts_with(['Z', '+', '-']) {
        return None;
    }
    parse(&format!("{date_part}T{hour}:00{rest}"))
}

fn midnight(d: NaiveDate) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?))
}

/// `YYYYMMDD` and `YYYYDDD` (ordinal); chrono's `%Y` is greedy, so the
/// separator-free forms need fixed-width handling.
fn parse_compact(s: &str) -> Option<DateTime<Utc>> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s.get(0..4)?.parse().ok()?;
    match s.len() {
        8 => {
            let month: u32 = s.get(4..6)?.parse().ok()?;
            let day: u32 = s.get(6..8)?.parse().ok()?;
            midnight(NaiveDate::from_ymd_opt(year, month, day)?)
        }
        7 => {
            let ordinal: u32 = s.get(4..7)?.parse().ok()?;
            midnight(NaiveDate::from_yo_opt(year, ordinal)?)
        }
        _ => None,
    }
}

/// `YYYY`, `YYYY-MM` and ordinal `YYYY-DDD`.
///
/// Kept out of the chrono format tables: `%j` accepts 1-3 digits, which
/// would swallow `2019-12` as day-of-year 12 instead of December.
fn parse_partial(s: &str) -> Option<DateTime<Utc>> {
    let bytes = s.as_bytes();
    match bytes.len() {
        4 if bytes.iter().all(u8::is_ascii_digit) => {
            midnight(NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1)?)
        }
        7 if bytes[4] == b'-' => {
            let year: i32 = s.get(0..4)?.parse().ok()?;
            let month: u32 = s.get(5..7)?.parse().ok()?;
            midnight(NaiveDate::from_ymd_opt(year, month, 1)?)
        }
        8 if bytes[4] == b'-' => {
            let year: i32 = s.get(0..4)?.parse().ok()?;
            let ordinal: u32 = s.get(5..8)?.parse().ok()?;
            midnight(NaiveDate::from_yo_opt(year, ordinal)?)
        }
        _ => None,
    }
}

/// `YYYY-[W]WW`, `YYYY[W]WW`, optionally followed by a weekday digit
fn parse_week_date(s: &str) -> Option<DateTime<Utc>> {
    let (year_part, rest) = s.split_once('W')?;
    let year_part = year_part.strip_suffix('-').unwrap_or(year_part);
    if year_part.len() != 4 {
        return None;
    }
    let year: i32 = year_part.parse().ok()?;
    let (week_part, day_part) = match rest.len() {
        2 => (rest, None),
        3 => (rest.get(0..2)?, rest.get(2..3)),
        4 if rest.as_bytes()[2] == b'-' => (rest.get(0..2)?, rest.get(3..4)),
        _ => return None,
    };
    let week: u32 = week_part.parse().ok()?;
    let weekday = match day_part {
        None => Weekday::Mon,
        Some("1") => Weekday::Mon,
        Some("2") => Weekday::Tue,
        Some("3") => Weekday::Wed,
        Some("4") => Weekday::Thu,
        Some("5") => Weekday::Fri,
        Some("6") => Weekday::Sat,
        Some("7") => Weekday::Sun,
        Some(_) => return None,
    };
    midnight(NaiveDate::from_isoywd_opt(year, week, weekday)?)
}

/// Reformat a stored date string using moment-style tokens.
///
/// Returns `None` when the stored value does not parse as a date.
pub fn format(s: &str, format_string: &str) -> Option<String> {
    let dt = parse(s)?;
    Some(dt.format(&moment_to_chrono(format_string, &dt)).to_string())
}

/// Moment token table, longest match first
const FORMAT_TOKENS: [(&str, &str); 21] = [
    ("YYYY", "%Y"),
    ("dddd", "%A"),
    ("MMMM", "%B"),
    ("SSS", "%3f"),
    ("MMM", "%b"),
    ("ddd", "%a"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("M", "%-m"),
    ("D", "%-d"),
    ("H", "%-H"),
    ("h", "%-I"),
    ("m", "%-M"),
    ("s", "%-S"),
    ("A", "%p"),
    ("X", "%s"),
];

fn moment_to_chrono(fmt: &str, dt: &DateTime<Utc>) -> String {
    let mut out = String::with_capacity(fmt.len() * 2);
    let mut rest = fmt;
    'outer: while !rest.is_empty() {
        // Bracketed text is literal.
        if let Some(stripped) = rest.strip_prefix('[') {
            let end = stripped.find(']').unwrap_or(stripped.len());
            push_literal(&mut out, &stripped[..end]);
            rest = stripped.get(end + 1..).unwrap_or("");
            continue;
        }
        for (token, replacement) in FORMAT_TOKENS {
            if let Some(stripped) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = stripped;
                continue 'outer;
            }
        }
        // Millisecond epoch has no chrono token; inline the digits.
        if let Some(stripped) = rest.strip_prefix('x') {
            push_literal(&mut out, &dt.timestamp_millis().to_string());
            rest = stripped;
            continue;
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            push_literal(&mut out, &c.to_string());
        }
        rest = chars.as_str();
    }
    out
}

fn push_literal(out: &mut String, literal: &str) {
    for c in literal.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}

/// Humanized relative time, e.g. `"3 days ago"` or `"in a month"`
pub fn from_now(s: &str, now: DateTime<Utc>) -> Option<String> {
    let then = parse(s)?;
    let seconds = now.signed_duration_since(then).num_seconds();
    let phrase = relative_phrase(seconds.unsigned_abs());
    Some(if seconds < 0 {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    })
}

fn relative_phrase(seconds: u64) -> String {
    let minutes = (seconds as f64 / 60.0).round() as u64;
    let hours = (minutes as f64 / 60.0).round() as u64;
    let days = (hours as f64 / 24.0).round() as u64;
    let months = (days as f64 / 30.44).round() as u64;
    let years = (days as f64 / 365.25).round() as u64;
    match () {
        () if seconds < 45 => "a few seconds".to_string(),
        () if seconds < 90 => "a minute".to_string(),
        () if minutes < 45 => format!("{minutes} minutes"),
        () if minutes < 90 => "an hour".to_string(),
        () if hours < 22 => format!("{hours} hours"),
        () if hours < 36 => "a day".to_string(),
        () if days < 26 => format!("{days} days"),
        () if days < 46 => "a month".to_string(),
        () if days < 320 => format!("{months} months"),
        () if days < 548 => "a year".to_string(),
        () => format!("{years} years"),
    }
}

/// Elapsed time between `now` and the stored date, in the given unit,
/// truncated toward zero. Unknown units fall back to milliseconds.
pub fn difference(s: &str, unit: &str, now: DateTime<Utc>) -> Option<i64> {
    let then = parse(s)?;
    let delta = now.signed_duration_since(then);
    let value = match unit.trim_end_matches('s').to_ascii_lowercase().as_str() {
        "year" => month_diff(now, then) / 12,
        "month" => month_diff(now, then),
        "week" => delta.num_weeks(),
        "day" => delta.num_days(),
        "hour" => delta.num_hours(),
        "minute" => delta.num_minutes(),
        "second" => delta.num_seconds(),
        _ => delta.num_milliseconds(),
    };
    Some(value)
}

/// Whole calendar months from `then` to `now` (negative when `then` is in
/// the future)
fn month_diff(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    let mut months = i64::from(now.year() - then.year()) * 12
        + (i64::from(now.month()) - i64::from(then.month()));
    if months > 0 {
        let overshoots = then
            .checked_add_months(Months::new(months.unsigned_abs() as u32))
            .is_some_and(|anchor| anchor > now);
        if overshoots {
            months -= 1;
        }
    } else if months < 0 {
        let overshoots = then
            .checked_sub_months(Months::new(months.unsigned_abs() as u32))
            .is_some_and(|anchor| anchor < now);
        if overshoots {
            months += 1;
        }
    }
    months
}
