//! TUI rendering traits for yearcal types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to yearcal-core types using owo_colors.

use std::path::Path;

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use yearcal_core::{CalendarEvent, display_text};

use crate::sources::LoadedSource;

/// Width of the badge column in event rows.
const BADGE_WIDTH: usize = 11;

/// Extension trait for rendering an event as one row of a day.
pub trait RenderRow {
    fn render_row(&self, date: NaiveDate) -> String;
}

impl RenderRow for CalendarEvent {
    fn render_row(&self, date: NaiveDate) -> String {
        let badge = display_text(self, date);
        let badge = format!("{badge:>BADGE_WIDTH$}");
        let title = if self.is_recurring {
            format!("{} ↻", self.title)
        } else {
            self.title.clone()
        };

        let mut row = format!("  {} {}", badge.cyan(), title);
        if let Some(calendar) = &self.calendar {
            row.push_str(&format!(" {}", format!("[{calendar}]").dimmed()));
        }
        if let Some(location) = &self.location {
            row.push_str(&format!(" {}", format!("@ {location}").dimmed()));
        }
        row
    }
}

/// Format a date as a day heading (e.g. "Mon Jun 16 2025").
pub fn day_heading(date: NaiveDate) -> String {
    date.format("%a %b %-d %Y").to_string()
}

/// Render events grouped under the day they start on, ordered by start.
pub fn render_agenda(events: &[CalendarEvent]) -> String {
    let mut ordered: Vec<&CalendarEvent> = events.iter().collect();
    ordered.sort_by_key(|e| (e.start, !e.all_day));

    let mut lines = Vec::new();
    let mut current: Option<NaiveDate> = None;

    for event in ordered {
        let date = event.start_date();
        if current != Some(date) {
            if current.is_some() {
                lines.push(String::new());
            }
            lines.push(day_heading(date).bold().to_string());
            current = Some(date);
        }
        lines.push(event.render_row(date));
    }

    lines.join("\n")
}

/// One-line summary of a loaded file.
pub fn render_source(source: &LoadedSource) -> String {
    let mut line = format!(
        "📅 {}: {} {} imported",
        display_name(&source.path),
        source.events.len(),
        pluralize("event", source.events.len())
    );
    if source.dropped > 0 {
        line.push_str(&format!(
            " {}",
            format!("({} skipped)", source.dropped).yellow()
        ));
    }
    if source.degraded > 0 {
        line.push_str(&format!(
            " {}",
            format!(
                "({} {} without recurrence)",
                source.degraded,
                pluralize("rule", source.degraded)
            )
            .yellow()
        ));
    }
    line
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
