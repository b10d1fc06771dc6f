mod commands;
mod render;
mod sources;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "yearcal")]
#[command(about = "Flatten ICS files and CalDAV feeds into per-day calendar events")]
struct Cli {
    /// Log dropped events and degraded recurrence rules
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import .ics files or CalDAV proxy feeds (.json) and list their events
    Import {
        /// Files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// First year to include (YYYY)
        #[arg(long)]
        from: Option<String>,

        /// Last year to include (YYYY)
        #[arg(long)]
        to: Option<String>,

        /// Print the flattened events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the events visible on one day
    Day {
        /// Date to show (YYYY-MM-DD)
        date: String,

        /// Files to read events from
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the matching events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the config file location and resolved settings, or change them
    Config {
        /// IANA timezone to display events in (e.g. Europe/Berlin)
        #[arg(long)]
        timezone: Option<String>,

        /// Years before the current one covered by default
        #[arg(long)]
        years_before: Option<u32>,

        /// Years after the current one covered by default
        #[arg(long)]
        years_after: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Import {
            files,
            from,
            to,
            json,
        } => commands::import::run(files, from.as_deref(), to.as_deref(), json).await,
        Commands::Day { date, files, json } => commands::day::run(&date, files, json).await,
        Commands::Config {
            timezone,
            years_before,
            years_after,
        } => commands::config::run(timezone, years_before, years_after),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "yearcal_core=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
