//! CalDAV proxy JSON feed.
//!
//! The proxy returns events that may still carry an RRULE. They go through
//! the same expander and year filter as ICS events, so a calendar looks the
//! same whichever way it was imported.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{FieldParseError, YearcalError, YearcalResult};
use crate::event::{CalendarEvent, Instant};
use crate::recurrence::{expand, parse_rrule};
use crate::timestamp::utc_to_display;
use crate::year_range::YearRange;

/// Top-level proxy response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub success: bool,
    #[serde(default)]
    pub events: Vec<FeedEvent>,
    /// Calendar metadata, passed through untouched.
    #[serde(default)]
    pub calendars: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One event as delivered by the proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEvent {
    pub title: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub rrule: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub calendar_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

impl FeedEvent {
    /// Convert into an unexpanded [`CalendarEvent`].
    ///
    /// The RRULE is kept on the event only when the feed flags it as recurring.
    pub fn to_calendar_event(&self, zone: Tz) -> Result<CalendarEvent, FieldParseError> {
        let start = parse_feed_timestamp(&self.start, self.all_day, zone)?;
        let end = self
            .end
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_feed_timestamp(s, self.all_day, zone))
            .transpose()?;

        let mut event = CalendarEvent::new(self.title.clone(), start);
        event.end = end;
        event.all_day = self.all_day;
        event.is_recurring = self.is_recurring;
        event.rrule = self.rrule.clone().filter(|_| self.is_recurring);
        event.description = self.description.clone();
        event.location = self.location.clone();
        event.uid = self.uid.clone();
        event.calendar = self.calendar_name.clone();
        event.refresh_id();
        Ok(event)
    }
}

/// Parse an ISO-8601 feed timestamp into the display zone.
///
/// - Values with `Z` or an offset are converted.
/// - Naive values are floating.
/// - All-day events keep the calendar date verbatim, at midnight.
pub fn parse_feed_timestamp(
    value: &str,
    all_day: bool,
    zone: Tz,
) -> Result<Instant, FieldParseError> {
    let value = value.trim();
    let invalid = || FieldParseError::Iso8601(value.to_string());

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    if all_day {
        let date_part = value.get(..10).ok_or_else(invalid)?;
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())?;
        return Ok(date.and_time(NaiveTime::MIN));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(utc_to_display(dt.naive_utc(), zone));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|_| invalid())
}

/// Expand one feed event into occurrences inside `range`.
///
/// Events without a residual rule (including already-expanded occurrences)
/// pass through unchanged. An unreadable rule keeps the base event as a
/// single, non-recurring occurrence.
pub fn expand_for_feed(event: &CalendarEvent, range: YearRange, zone: Tz) -> Vec<CalendarEvent> {
    let expanded = match event.rrule.as_deref().filter(|_| event.is_recurring) {
        None => vec![event.clone()],
        Some(token) => match parse_rrule(token, zone) {
            Ok(rule) => expand(event, &rule, range),
            Err(error) => {
                tracing::debug!(
                    title = %event.title,
                    %error,
                    "feed RRULE unreadable, keeping single event"
                );
                let mut single = event.clone();
                single.rrule = None;
                single.is_recurring = false;
                single.refresh_id();
                vec![single]
            }
        },
    };

    expanded
        .into_iter()
        .filter(|e| range.contains(&e.start))
        .collect()
}

/// Result of importing a feed payload.
#[derive(Debug, Clone, Default)]
pub struct FeedImport {
    pub events: Vec<CalendarEvent>,
    /// Feed events skipped because a timestamp could not be read.
    pub skipped: usize,
    pub calendars: Vec<serde_json::Value>,
}

/// Deserialize a proxy payload.
pub fn parse_feed(json: &str) -> YearcalResult<FeedResponse> {
    let response: FeedResponse = serde_json::from_str(json)?;
    if !response.success {
        return Err(YearcalError::Feed(
            response
                .error
                .unwrap_or_else(|| "proxy reported failure".to_string()),
        ));
    }
    Ok(response)
}

/// Parse a proxy payload and flatten it into occurrences inside `range`.
pub fn import_feed(json: &str, range: YearRange, zone: Tz) -> YearcalResult<FeedImport> {
    let response = parse_feed(json)?;

    let mut import = FeedImport {
        calendars: response.calendars,
        ..FeedImport::default()
    };

    for feed_event in &response.events {
        match feed_event.to_calendar_event(zone) {
            Ok(event) => import.events.extend(expand_for_feed(&event, range, zone)),
            Err(error) => {
                tracing::debug!(title = %feed_event.title, %error, "skipping feed event");
                import.skipped += 1;
            }
        }
    }

    Ok(import)
}
