//! Inclusive range of calendar years an import is bounded to.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{YearcalError, YearcalResult};
use crate::event::Instant;

/// Inclusive `[start_year, end_year]` range.
///
/// The current year is always supplied by the caller; nothing in the core
/// reads the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start_year: i32,
    pub end_year: i32,
}

impl YearRange {
    pub fn new(start_year: i32, end_year: i32) -> YearcalResult<Self> {
        if start_year > end_year {
            return Err(YearcalError::InvalidRange(format!(
                "start year {start_year} is after end year {end_year}"
            )));
        }
        if NaiveDate::from_ymd_opt(start_year, 1, 1).is_none()
            || NaiveDate::from_ymd_opt(end_year, 12, 31).is_none()
        {
            return Err(YearcalError::InvalidRange(format!(
                "years {start_year}..={end_year} are outside the supported calendar"
            )));
        }
        Ok(YearRange {
            start_year,
            end_year,
        })
    }

    /// Range of a single year.
    pub fn single(year: i32) -> YearcalResult<Self> {
        Self::new(year, year)
    }

    /// Range around `current_year`, reaching `before` years back and `after` ahead.
    pub fn around(current_year: i32, before: u32, after: u32) -> YearcalResult<Self> {
        let start = i64::from(current_year) - i64::from(before);
        let end = i64::from(current_year) + i64::from(after);
        let (Ok(start), Ok(end)) = (i32::try_from(start), i32::try_from(end)) else {
            return Err(YearcalError::InvalidRange(format!(
                "{before} years before / {after} after {current_year} overflows"
            )));
        };
        Self::new(start, end)
    }

    /// Parse `--from` / `--to` style arguments.
    /// Missing bounds fall back to `default`.
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        default: YearRange,
    ) -> YearcalResult<Self> {
        let start = match from {
            Some(s) => parse_year(s)?,
            None => default.start_year,
        };
        let end = match to {
            Some(s) => parse_year(s)?,
            None if from.is_some() => start.max(default.end_year),
            None => default.end_year,
        };
        Self::new(start, end)
    }

    /// Midnight on Jan 1 of `start_year`.
    pub fn start_boundary(&self) -> Instant {
        NaiveDate::from_ymd_opt(self.start_year, 1, 1)
            .unwrap_or(NaiveDate::MIN)
            .and_time(NaiveTime::MIN)
    }

    /// Last representable instant of Dec 31 of `end_year`.
    pub fn end_boundary(&self) -> Instant {
        let last_day = NaiveDate::from_ymd_opt(self.end_year, 12, 31).unwrap_or(NaiveDate::MAX);
        last_day
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap_or_else(|| last_day.and_time(NaiveTime::MIN))
    }

    pub fn contains_year(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }

    /// Whether `instant` falls in one of the range's years.
    pub fn contains(&self, instant: &Instant) -> bool {
        self.contains_year(instant.year())
    }
}

fn parse_year(s: &str) -> YearcalResult<i32> {
    s.trim()
        .parse::<i32>()
        .map_err(|_| YearcalError::InvalidRange(format!("Invalid year '{s}'. Expected YYYY")))
}
