pub mod config;
pub mod day;
pub mod import;

use anyhow::Result;
use chrono::Datelike;
use chrono_tz::Tz;
use yearcal_core::YearRange;
use yearcal_core::config::YearcalConfig;

/// Zone used when neither the config nor the system names one.
const FALLBACK_TIMEZONE: &str = "UTC";

/// Settings every command resolves before touching files.
pub struct Settings {
    pub config: YearcalConfig,
    pub zone: Tz,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let config = YearcalConfig::load()?;
        let system =
            iana_time_zone::get_timezone().unwrap_or_else(|_| FALLBACK_TIMEZONE.to_string());
        let zone = config.timezone_or(&system)?;
        Ok(Settings { config, zone })
    }

    /// Current year in the display zone. The only wall-clock read in yearcal.
    pub fn current_year(&self) -> i32 {
        chrono::Utc::now().with_timezone(&self.zone).year()
    }

    /// Range from `--from`/`--to`, defaulting to the configured span.
    pub fn range(&self, from: Option<&str>, to: Option<&str>) -> Result<YearRange> {
        let default = self.config.default_range(self.current_year())?;
        Ok(YearRange::from_args(from, to, default)?)
    }
}
