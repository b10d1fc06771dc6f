//! Reading event sources from disk.
//!
//! Each file is read and parsed on its own task; the core holds no shared
//! state, so sources are independent.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use tokio::task::JoinSet;
use yearcal_core::{CalendarEvent, YearRange, import_feed, parse_with_report};

/// How a file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Ics,
    Feed,
}

impl SourceKind {
    /// `.json` files are proxy feeds, everything else is read as ICS.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceKind::Feed,
            _ => SourceKind::Ics,
        }
    }
}

/// Events read from one file.
#[derive(Debug)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub events: Vec<CalendarEvent>,
    /// VEVENT blocks or feed entries that could not be used.
    pub dropped: usize,
    /// Recurrence rules that were unreadable and kept as single events.
    pub degraded: usize,
}

/// Load every file, returning sources in the order they were given.
pub async fn load_all(
    paths: Vec<PathBuf>,
    range: YearRange,
    zone: Tz,
) -> Result<Vec<LoadedSource>> {
    let mut tasks = JoinSet::new();

    for (index, path) in paths.into_iter().enumerate() {
        tasks.spawn(async move {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Could not read {}", path.display()))?;
            let loaded =
                tokio::task::spawn_blocking(move || load_content(path, &content, range, zone))
                    .await??;
            Ok::<_, anyhow::Error>((index, loaded))
        });
    }

    let mut loaded = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        loaded.push(joined??);
    }
    loaded.sort_by_key(|(index, _)| *index);

    Ok(loaded.into_iter().map(|(_, source)| source).collect())
}

fn load_content(path: PathBuf, content: &str, range: YearRange, zone: Tz) -> Result<LoadedSource> {
    match SourceKind::of(&path) {
        SourceKind::Ics => {
            let outcome = parse_with_report(content, range, zone);
            Ok(LoadedSource {
                path,
                events: outcome.events,
                dropped: outcome.report.dropped_blocks,
                degraded: outcome.report.degraded_rules,
            })
        }
        SourceKind::Feed => {
            let import = import_feed(content, range, zone)
                .with_context(|| format!("Could not import feed {}", path.display()))?;
            Ok(LoadedSource {
                path,
                events: import.events,
                dropped: import.skipped,
                degraded: 0,
            })
        }
    }
}
