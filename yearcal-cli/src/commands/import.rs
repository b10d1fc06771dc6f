use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use yearcal_core::CalendarEvent;

use super::Settings;
use crate::render::{pluralize, render_agenda, render_source};
use crate::sources::load_all;

pub async fn run(
    files: Vec<PathBuf>,
    from: Option<&str>,
    to: Option<&str>,
    json: bool,
) -> Result<()> {
    let settings = Settings::load()?;
    let range = settings.range(from, to)?;

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!(
        "Importing {} {} for {}–{}",
        files.len(),
        pluralize("file", files.len()),
        range.start_year,
        range.end_year
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = load_all(files, range, settings.zone).await;
    spinner.finish_and_clear();
    let sources = result?;

    let events: Vec<CalendarEvent> = sources
        .iter()
        .flat_map(|source| source.events.iter().cloned())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    for source in &sources {
        println!("{}", render_source(source));
    }

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    println!();
    println!("{}", render_agenda(&events));
    println!(
        "\n{} {} imported",
        events.len(),
        pluralize("event", events.len())
    );

    Ok(())
}
