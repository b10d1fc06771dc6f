//! ICS date and datetime tokens.
//!
//! Tokens come in three shapes:
//! - `YYYYMMDD`: date only, local midnight, no zone conversion
//! - `YYYYMMDDTHHMMSSZ`: UTC, converted into the display zone
//! - `YYYYMMDDTHHMMSS`: floating, already in the display zone

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::FieldParseError;
use crate::event::Instant;

/// How a timestamp token is anchored in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    Date,
    Floating,
    Utc,
}

impl TimestampKind {
    /// Classify a token by its separators without validating the digits.
    pub fn of(token: &str) -> Self {
        let token = token.trim();
        if !token.contains('T') {
            TimestampKind::Date
        } else if token.ends_with('Z') {
            TimestampKind::Utc
        } else {
            TimestampKind::Floating
        }
    }
}

/// Parse an ICS timestamp token into a calendar-local instant.
pub fn parse_ics_timestamp(token: &str, zone: Tz) -> Result<Instant, FieldParseError> {
    let token = token.trim();
    if !token.is_ascii() {
        return Err(FieldParseError::NonNumeric(token.to_string()));
    }

    match TimestampKind::of(token) {
        TimestampKind::Date => {
            let date = parse_date_part(token, token)?;
            Ok(date.and_time(chrono::NaiveTime::MIN))
        }
        kind => {
            let (date_part, time_part) = token
                .split_once('T')
                .ok_or_else(|| FieldParseError::Shape(token.to_string()))?;
            let time_part = match kind {
                TimestampKind::Utc => &time_part[..time_part.len() - 1],
                _ => time_part,
            };

            let date = parse_date_part(date_part, token)?;
            if time_part.len() != 6 {
                return Err(FieldParseError::Shape(token.to_string()));
            }
            let hour = digits(&time_part[0..2], token)?;
            let minute = digits(&time_part[2..4], token)?;
            let second = digits(&time_part[4..6], token)?;
            let naive = date
                .and_hms_opt(hour, minute, second)
                .ok_or_else(|| FieldParseError::OutOfRange(token.to_string()))?;

            Ok(match kind {
                TimestampKind::Utc => utc_to_display(naive, zone),
                _ => naive,
            })
        }
    }
}

/// Convert a UTC wall-clock value into the display zone.
pub fn utc_to_display(utc: NaiveDateTime, zone: Tz) -> Instant {
    Utc.from_utc_datetime(&utc).with_timezone(&zone).naive_local()
}

fn parse_date_part(part: &str, token: &str) -> Result<NaiveDate, FieldParseError> {
    if part.len() != 8 {
        return Err(FieldParseError::Shape(token.to_string()));
    }
    let year = digits(&part[0..4], token)?;
    let month = digits(&part[4..6], token)?;
    let day = digits(&part[6..8], token)?;

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(|| FieldParseError::OutOfRange(token.to_string()))
}

fn digits(field: &str, token: &str) -> Result<u32, FieldParseError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldParseError::NonNumeric(token.to_string()));
    }
    field
        .parse()
        .map_err(|_| FieldParseError::NonNumeric(token.to_string()))
}
