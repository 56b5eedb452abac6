//! Date, time, duration and timestamp parsing for upload values.
//!
//! Clients send ISO-8601 text with a few well-known variations: a space
//! instead of `T`, offsets with or without a colon, and missing seconds.
//! Each accepted variation is a chrono format string, tried in order.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    ParseResult, TimeZone, Utc,
};
use chrono::format::ParseErrorKind;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors that can occur during temporal parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemporalError {
    /// The input string is empty or blank.
    #[error("empty string")]
    EmptyString,

    /// The input doesn't match the expected format.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// The components parse but don't name a real date, time or offset.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

impl TemporalError {
    const fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange(_))
    }
}

const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

// A space in a chrono format matches any run of whitespace, including none.
const OFFSET_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f %#z",
    "%Y-%m-%dT%H:%M %#z",
    "%Y-%m-%d %H:%M:%S%.f %#z",
    "%Y-%m-%d %H:%M %#z",
];

const LOCAL_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const LOCAL_TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^P(?:(-?[0-9]+)Y)?(?:(-?[0-9]+)M)?(?:(-?[0-9]+)W)?(?:(-?[0-9]+)D)?(?:T(?:(-?[0-9]+)H)?(?:(-?[0-9]+)M)?(?:(-?[0-9]+(?:[.,][0-9]+)?)S)?)?$",
    )
    .expect("duration pattern is valid")
});

fn non_blank(input: &str) -> Result<&str, TemporalError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(TemporalError::EmptyString)
    } else {
        Ok(trimmed)
    }
}

/// Tries each format in turn, returning the first successful parse.
///
/// Fails with `OutOfRange` when some format matched the shape of the input
/// but a component was invalid, `InvalidFormat` otherwise.
fn parse_first<T>(
    input: &str,
    formats: &[&str],
    parse: impl Fn(&str, &str) -> ParseResult<T>,
) -> Result<T, TemporalError> {
    let mut out_of_range = false;
    for &format in formats {
        match parse(input, format) {
            Ok(parsed) => return Ok(parsed),
            Err(err) => {
                out_of_range |= matches!(
                    err.kind(),
                    ParseErrorKind::OutOfRange | ParseErrorKind::Impossible
                );
            }
        }
    }

    if out_of_range {
        Err(TemporalError::OutOfRange(input.to_string()))
    } else {
        Err(TemporalError::InvalidFormat(input.to_string()))
    }
}

/// Parses a calendar date from the first ten characters of `input`.
///
/// Full timestamps and annotated dates (`2015-12-25 @ lunchtime`) yield their
/// date part.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, TemporalError> {
    let trimmed = non_blank(input)?;
    let prefix = trimmed
        .get(..10)
        .ok_or_else(|| TemporalError::InvalidFormat(trimmed.to_string()))?;
    parse_first(prefix, &[CALENDAR_DATE_FORMAT], NaiveDate::parse_from_str)
        .map_err(|err| match err {
            TemporalError::OutOfRange(_) => TemporalError::OutOfRange(trimmed.to_string()),
            _ => TemporalError::InvalidFormat(trimmed.to_string()),
        })
}

/// Parses a date-time with an optional UTC offset, keeping the offset.
///
/// `Z`, `±HH:MM`, `±HHMM` and `±HH` offsets are accepted. A missing offset
/// means UTC. A date without a time is rejected.
pub fn parse_timestamp(input: &str) -> Result<DateTime<FixedOffset>, TemporalError> {
    let trimmed = non_blank(input)?;
    let normalized = trimmed
        .strip_suffix('Z')
        .map_or_else(|| trimmed.to_string(), |rest| format!("{rest}+00:00"));

    let with_offset = match parse_first(&normalized, &OFFSET_TIMESTAMP_FORMATS, |s, format| {
        DateTime::parse_from_str(s, format)
    }) {
        Ok(dt) => return Ok(dt),
        Err(err) => err,
    };

    let local = match parse_first(&normalized, &LOCAL_TIMESTAMP_FORMATS, |s, format| {
        NaiveDateTime::parse_from_str(s, format)
    }) {
        Ok(naive) => return Ok(Utc.fix().from_utc_datetime(&naive)),
        Err(err) => err,
    };

    if with_offset.is_out_of_range() || local.is_out_of_range() {
        Err(TemporalError::OutOfRange(trimmed.to_string()))
    } else {
        Err(TemporalError::InvalidFormat(trimmed.to_string()))
    }
}

/// Parses a local time of day (`HH:MM`, `HH:MM:SS` or `HH:MM:SS.fff`).
pub fn parse_local_time(input: &str) -> Result<NaiveTime, TemporalError> {
    let trimmed = non_blank(input)?;
    parse_first(trimmed, &LOCAL_TIME_FORMATS, NaiveTime::parse_from_str)
}

/// True if `input` is an ISO-8601 duration such as `PT1H` or `P1Y2M3DT4H5M6.5S`.
#[must_use]
pub fn is_valid_iso_duration(input: &str) -> bool {
    let Some(caps) = DURATION.captures(input) else {
        return false;
    };
    let has_component = caps.iter().skip(1).any(|m| m.is_some());
    let has_time_component = (5..=7).any(|i| caps.get(i).is_some());
    has_component && (input.contains('T') == has_time_component)
}

/// Converts epoch milliseconds to a UTC timestamp.
#[must_use]
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Canonical timestamp text: UTC, millisecond precision.
#[must_use]
pub fn format_timestamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Canonical local time text, `HH:MM:SS.mmm`.
#[must_use]
pub fn format_local_time(time: &NaiveTime) -> String {
    time.format("%H:%M:%S%.3f").to_string()
}

/// Canonical calendar date text, `YYYY-MM-DD`.
#[must_use]
pub fn format_calendar_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
