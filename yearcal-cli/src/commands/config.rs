use anyhow::Result;
use owo_colors::OwoColorize;
use yearcal_core::config::YearcalConfig;

use super::Settings;

pub fn run(
    timezone: Option<String>,
    years_before: Option<u32>,
    years_after: Option<u32>,
) -> Result<()> {
    let config_path = YearcalConfig::config_path()?;

    if timezone.is_some() || years_before.is_some() || years_after.is_some() {
        let mut config = YearcalConfig::read_file(&config_path)?;
        if let Some(name) = timezone {
            // Reject unknown zones before they reach the file.
            config.display_timezone = Some(name.clone());
            config.timezone_or(&name)?;
        }
        if let Some(years) = years_before {
            config.years_before = years;
        }
        if let Some(years) = years_after {
            config.years_after = years;
        }
        config.save(&config_path)?;
        println!("{}", "Config updated".green());
        println!();
    }

    let settings = Settings::load()?;
    let range = settings.config.default_range(settings.current_year())?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!();
    println!("{}", "Settings".bold());
    println!("  Timezone:   {}", settings.zone.name());
    println!("  Range:      {}–{}", range.start_year, range.end_year);

    Ok(())
}
