//! Core library for yearcal.
//!
//! Turns ICS documents and CalDAV proxy feeds into a flat list of concrete
//! event occurrences for a range of years, and answers per-day queries on it:
//! - `timestamp` normalizes ICS date tokens into the display timezone
//! - `recurrence` parses RRULEs and expands them into occurrences
//! - `ics` scans VEVENT blocks out of a document
//! - `feed` adapts the JSON proxy feed onto the same pipeline
//! - `query` decides which events show on a day and with what badge

pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod ics;
pub mod query;
pub mod recurrence;
pub mod timestamp;
pub mod year_range;

pub use error::{FieldParseError, RuleParseError, YearcalError, YearcalResult};
pub use event::{CalendarEvent, EventId, Instant, OccurrenceKey};
pub use feed::{expand_for_feed, import_feed};
pub use ics::{parse, parse_with_report};
pub use query::{display_text, events_on};
pub use year_range::YearRange;
