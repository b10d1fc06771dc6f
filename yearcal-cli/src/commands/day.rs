use std::path::PathBuf;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use owo_colors::OwoColorize;
use yearcal_core::{CalendarEvent, YearRange, events_on};

use super::Settings;
use crate::render::{RenderRow, day_heading};
use crate::sources::load_all;

pub async fn run(date: &str, files: Vec<PathBuf>, json: bool) -> Result<()> {
    let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
        anyhow::bail!("Invalid date '{}'. Expected YYYY-MM-DD", date);
    };
    let settings = Settings::load()?;

    // Include the previous year so spans starting before Jan 1 still show.
    let range = YearRange::new(date.year() - 1, date.year())?;

    let sources = load_all(files, range, settings.zone).await?;
    let events: Vec<CalendarEvent> = sources.into_iter().flat_map(|s| s.events).collect();
    let visible = events_on(&events, date);

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    println!("{}", day_heading(date).bold());
    if visible.is_empty() {
        println!("  {}", "No events".dimmed());
    }
    for event in visible {
        println!("{}", event.render_row(date));
    }

    Ok(())
}
