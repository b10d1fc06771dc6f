//! Flattened calendar events.
//!
//! Every event produced by the ICS parser or the feed adapter is a concrete
//! occurrence: recurrence has already been resolved, so the list can be
//! queried per day without knowing where the events came from.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Calendar-local wall-clock timestamp, expressed in the display timezone.
pub type Instant = NaiveDateTime;

/// Namespace for the v5 UUIDs handed out by [`EventId`].
const EVENT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a9e_4b7d_5e30_9a1f_c3d8_07b2_e415);

/// Field separator used when hashing several values into one id.
const ID_SEPARATOR: char = '\u{1f}';

/// Stable identifier derived from event content.
///
/// Regenerating the event list from the same source yields the same ids, so
/// collaborators can match events across reloads without storing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Derive the id for `event`.
    ///
    /// - Expanded occurrences share a UID, so their start is mixed in.
    /// - Single events use the UID alone, or title + start when there is none.
    pub fn derive(event: &CalendarEvent) -> Self {
        let start = event.start.format("%Y%m%dT%H%M%S");
        let name = match (&event.uid, event.is_recurring) {
            (Some(uid), false) => uid.clone(),
            (Some(uid), true) => format!("{uid}{ID_SEPARATOR}{start}"),
            (None, _) => format!("{}{ID_SEPARATOR}{start}", event.title),
        };
        EventId(Uuid::new_v5(&EVENT_ID_NAMESPACE, name.as_bytes()))
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value key collaborators use to match an event for update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceKey {
    pub title: String,
    pub start: Instant,
    pub all_day: bool,
}

/// A concrete calendar event occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    pub start: Instant,
    /// Exclusive for all-day events: the day after the last included day.
    pub end: Option<Instant>,
    pub all_day: bool,
    /// True for every occurrence produced by expanding a recurrence rule.
    pub is_recurring: bool,

    /// Unexpanded RRULE. Only feed events awaiting expansion carry one;
    /// expanded occurrences and ICS events never do.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rrule: Option<String>,

    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub organizer: Option<String>,
    pub attendees: Vec<String>,
    pub uid: Option<String>,

    /// Source calendar name, when the feed reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
}

impl CalendarEvent {
    /// Create a non-recurring event with only the required fields set.
    pub fn new(title: impl Into<String>, start: Instant) -> Self {
        let mut event = CalendarEvent {
            id: EventId(Uuid::nil()),
            title: title.into(),
            start,
            end: None,
            all_day: false,
            is_recurring: false,
            rrule: None,
            description: None,
            location: None,
            url: None,
            organizer: None,
            attendees: Vec::new(),
            uid: None,
            calendar: None,
        };
        event.refresh_id();
        event
    }

    /// Recompute `id` after the fields it is derived from changed.
    pub fn refresh_id(&mut self) {
        self.id = EventId::derive(self);
    }

    pub fn occurrence_key(&self) -> OccurrenceKey {
        OccurrenceKey {
            title: self.title.clone(),
            start: self.start,
            all_day: self.all_day,
        }
    }

    /// Whether `self` and `other` denote the same occurrence by value.
    pub fn same_occurrence(&self, other: &CalendarEvent) -> bool {
        self.title == other.title && self.start == other.start && self.all_day == other.all_day
    }

    /// `end - start`, zero when the event has no end.
    pub fn duration(&self) -> Duration {
        self.end.map(|end| end - self.start).unwrap_or_else(Duration::zero)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Last day an all-day event covers, honouring the exclusive end.
    ///
    /// Returns `None` for timed events and for all-day events without an end.
    pub fn last_included_day(&self) -> Option<NaiveDate> {
        if !self.all_day {
            return None;
        }
        let end = self.end?.date();
        end.pred_opt()
    }

    /// All-day event covering more than one calendar day.
    pub fn is_multi_day(&self) -> bool {
        self.last_included_day()
            .is_some_and(|last| last > self.start_date())
    }

    /// Build the occurrence of this event starting at `start`.
    ///
    /// The duration is preserved, the residual rule is dropped and the id is
    /// re-derived for the new start. Returns `None` when the end would fall
    /// outside chrono's calendar.
    pub fn occurrence_at(&self, start: Instant, duration: Duration) -> Option<CalendarEvent> {
        let end = match self.end {
            Some(_) => Some(start.checked_add_signed(duration)?),
            None => None,
        };

        let mut occurrence = self.clone();
        occurrence.start = start;
        occurrence.end = end;
        occurrence.rrule = None;
        occurrence.is_recurring = true;
        occurrence.refresh_id();
        Some(occurrence)
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Instant {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_id_is_stable_across_regeneration() {
        let a = CalendarEvent::new("Standup", at(2025, 1, 6, 9));
        let b = CalendarEvent::new("Standup", at(2025, 1, 6, 9));
        assert_eq!(a.id, b.id);

        let c = CalendarEvent::new("Standup", at(2025, 1, 7, 9));
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_id_prefers_uid_for_single_events() {
        let mut a = CalendarEvent::new("Old title", at(2025, 1, 6, 9));
        a.uid = Some("abc@example.com".to_string());
        a.refresh_id();

        let mut b = CalendarEvent::new("New title", at(2025, 2, 1, 10));
        b.uid = Some("abc@example.com".to_string());
        b.refresh_id();

        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_occurrences_of_one_series_get_distinct_ids() {
        let mut base = CalendarEvent::new("Gym", at(2025, 1, 6, 18));
        base.uid = Some("gym@example.com".to_string());
        base.end = Some(at(2025, 1, 6, 19));

        let first = base.occurrence_at(at(2025, 1, 6, 18), base.duration()).unwrap();
        let second = base.occurrence_at(at(2025, 1, 13, 18), base.duration()).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.end, Some(at(2025, 1, 13, 19)));
        assert!(second.is_recurring);
        assert!(second.rrule.is_none());
    }

    #[test]
    fn test_occurrence_past_calendar_end_is_none() {
        let mut base = CalendarEvent::new("Era", at(2025, 1, 1, 0));
        base.end = Some(at(9999, 12, 31, 0));

        let late = NaiveDate::from_ymd_opt(262_000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(base.occurrence_at(late, base.duration()).is_none());

        let mut open_ended = base.clone();
        open_ended.end = None;
        assert!(open_ended.occurrence_at(late, base.duration()).is_some());
    }

    #[test]
    fn test_last_included_day_uses_exclusive_end() {
        let mut event = CalendarEvent::new("Trip", at(2025, 6, 15, 0));
        event.all_day = true;
        event.end = Some(at(2025, 6, 18, 0));

        assert_eq!(
            event.last_included_day(),
            NaiveDate::from_ymd_opt(2025, 6, 17)
        );
        assert!(event.is_multi_day());

        event.end = Some(at(2025, 6, 16, 0));
        assert!(!event.is_multi_day());
    }

    #[test]
    fn test_same_occurrence_ignores_descriptive_fields() {
        let a = CalendarEvent::new("Dentist", at(2025, 3, 3, 14));
        let mut b = a.clone();
        b.description = Some("bring forms".to_string());
        b.location = Some("Main St".to_string());

        assert!(a.same_occurrence(&b));
        assert_eq!(a.occurrence_key(), b.occurrence_key());
    }
}
