//! Per-day occurrence queries used when rendering a calendar row.

use chrono::NaiveDate;

use crate::event::CalendarEvent;

/// Label for single-day all-day events.
pub const ALL_DAY_LABEL: &str = "All day";

/// Events visible on `date`, in input order.
pub fn events_on(events: &[CalendarEvent], date: NaiveDate) -> Vec<&CalendarEvent> {
    events.iter().filter(|event| occurs_on(event, date)).collect()
}

/// Whether `event` is visible on `date`.
///
/// Timed events only show on their start day, whatever their duration.
/// Multi-day all-day events cover `[start, end - 1 day]`.
pub fn occurs_on(event: &CalendarEvent, date: NaiveDate) -> bool {
    let start = event.start_date();
    if !event.is_multi_day() {
        return start == date;
    }
    match event.last_included_day() {
        Some(last) => start <= date && date <= last,
        None => start == date,
    }
}

/// Badge text for `event` on `date`: a start time, "All day", or "Day i of n".
///
/// An empty string means no badge.
pub fn display_text(event: &CalendarEvent, date: NaiveDate) -> String {
    if !event.all_day {
        return event.start.format("%H:%M").to_string();
    }
    if !event.is_multi_day() {
        return ALL_DAY_LABEL.to_string();
    }

    let start = event.start_date();
    let Some(last) = event.last_included_day() else {
        return ALL_DAY_LABEL.to_string();
    };

    let total_days = (last - start).num_days() + 1;
    let day_index = (date - start).num_days() + 1;

    if total_days <= 1 {
        return String::new();
    }
    format!("Day {day_index} of {total_days}")
}
