//! RRULE token parsing.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;

use crate::error::RuleParseError;
use crate::event::Instant;
use crate::timestamp::{TimestampKind, parse_ics_timestamp};

/// Recurrence frequency. Only the four calendar frequencies are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn from_ics_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Some(Frequency::Daily),
            "WEEKLY" => Some(Frequency::Weekly),
            "MONTHLY" => Some(Frequency::Monthly),
            "YEARLY" => Some(Frequency::Yearly),
            _ => None,
        }
    }

    /// Shortest possible gap between two occurrences at interval 1.
    pub fn min_period_days(&self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 28,
            Frequency::Yearly => 365,
        }
    }
}

/// One BYDAY entry, e.g. `MO`, `2TU` or `-1FR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayNum {
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

impl FromStr for WeekdayNum {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entry = s.trim().to_ascii_uppercase();
        let invalid = || RuleParseError::Weekday(s.trim().to_string());

        if entry.len() < 2 || !entry.is_ascii() {
            return Err(invalid());
        }
        let (ordinal, code) = entry.split_at(entry.len() - 2);

        let weekday = match code {
            "MO" => Weekday::Mon,
            "TU" => Weekday::Tue,
            "WE" => Weekday::Wed,
            "TH" => Weekday::Thu,
            "FR" => Weekday::Fri,
            "SA" => Weekday::Sat,
            "SU" => Weekday::Sun,
            _ => return Err(invalid()),
        };
        let ordinal = match ordinal {
            "" => None,
            n => Some(n.parse::<i8>().map_err(|_| invalid())?),
        };

        Ok(WeekdayNum { ordinal, weekday })
    }
}

/// An EXDATE value the expander must skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    /// Date-only exception: skips any occurrence on that day.
    Day(NaiveDate),
    /// Skips the occurrence starting exactly at this instant.
    At(Instant),
}

impl Exception {
    pub fn parse(token: &str, zone: Tz) -> Option<Self> {
        let instant = parse_ics_timestamp(token, zone).ok()?;
        Some(match TimestampKind::of(token) {
            TimestampKind::Date => Exception::Day(instant.date()),
            _ => Exception::At(instant),
        })
    }

    pub fn matches(&self, start: &Instant) -> bool {
        match self {
            Exception::Day(day) => start.date() == *day,
            Exception::At(at) => start == at,
        }
    }
}

/// A parsed RRULE.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRule {
    /// `None` when FREQ is missing or unknown: only the base occurrence is produced.
    pub freq: Option<Frequency>,
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<Instant>,
    /// Parsed but not used for placement: occurrences repeat on the anchor's weekday.
    pub by_day: Option<Vec<WeekdayNum>>,
    pub exceptions: Vec<Exception>,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        RecurrenceRule {
            freq: None,
            interval: 1,
            count: None,
            until: None,
            by_day: None,
            exceptions: Vec::new(),
        }
    }
}

impl RecurrenceRule {
    pub fn with_exceptions(mut self, exceptions: Vec<Exception>) -> Self {
        self.exceptions = exceptions;
        self
    }

    pub fn is_excluded(&self, start: &Instant) -> bool {
        self.exceptions.iter().any(|e| e.matches(start))
    }
}

/// Parse a `KEY=VALUE;KEY=VALUE` RRULE token.
///
/// Unknown keys and segments without `=` are ignored. A date-only UNTIL covers
/// the whole of its day.
pub fn parse_rrule(token: &str, zone: Tz) -> Result<RecurrenceRule, RuleParseError> {
    let token = token.trim();
    let token = token.strip_prefix("RRULE:").unwrap_or(token);

    let mut rule = RecurrenceRule::default();

    for part in token.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_uppercase().as_str() {
            "FREQ" => rule.freq = Frequency::from_ics_str(value),
            "INTERVAL" => rule.interval = parse_positive("INTERVAL", value)?,
            "COUNT" => rule.count = Some(parse_positive("COUNT", value)?),
            "UNTIL" => {
                let until = parse_ics_timestamp(value, zone).map_err(RuleParseError::Until)?;
                rule.until = Some(match TimestampKind::of(value) {
                    TimestampKind::Date => until.date().and_time(end_of_day()),
                    _ => until,
                });
            }
            "BYDAY" => {
                let days = value
                    .split(',')
                    .filter(|d| !d.trim().is_empty())
                    .map(WeekdayNum::from_str)
                    .collect::<Result<Vec<_>, _>>()?;
                rule.by_day = Some(days);
            }
            _ => {}
        }
    }

    Ok(rule)
}

fn parse_positive(key: &'static str, value: &str) -> Result<u32, RuleParseError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(RuleParseError::NotPositive {
            key,
            value: value.to_string(),
        }),
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
