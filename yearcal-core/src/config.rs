//! Global yearcal configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{YearcalError, YearcalResult};
use crate::year_range::YearRange;

const DEFAULT_YEARS_BEFORE: u32 = 0;
const DEFAULT_YEARS_AFTER: u32 = 1;

fn default_years_before() -> u32 {
    DEFAULT_YEARS_BEFORE
}

fn default_years_after() -> u32 {
    DEFAULT_YEARS_AFTER
}

/// Global configuration at ~/.config/yearcal/config.toml
///
/// Every key can be overridden with a `YEARCAL_` environment variable,
/// e.g. `YEARCAL_DISPLAY_TIMEZONE=Europe/Berlin`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct YearcalConfig {
    /// IANA zone events are displayed in. Unset means the system zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_timezone: Option<String>,

    /// Years before the current one included in the default range.
    #[serde(default = "default_years_before")]
    pub years_before: u32,

    /// Years after the current one included in the default range.
    #[serde(default = "default_years_after")]
    pub years_after: u32,
}

impl Default for YearcalConfig {
    fn default() -> Self {
        YearcalConfig {
            display_timezone: None,
            years_before: DEFAULT_YEARS_BEFORE,
            years_after: DEFAULT_YEARS_AFTER,
        }
    }
}

impl YearcalConfig {
    pub fn config_path() -> YearcalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| YearcalError::Config("Could not determine config directory".into()))?
            .join("yearcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config, creating a commented default file on first use.
    pub fn load() -> YearcalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (optional) layered with `YEARCAL_*` variables.
    pub fn load_from(path: &Path) -> YearcalResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("YEARCAL"))
            .build()
            .map_err(|e| YearcalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| YearcalError::Config(e.to_string()))
    }

    /// Resolve `display_timezone`, or `fallback` when it is unset.
    pub fn timezone_or(&self, fallback: &str) -> YearcalResult<Tz> {
        let name = self.display_timezone.as_deref().unwrap_or(fallback);
        name.parse::<Tz>()
            .map_err(|_| YearcalError::UnknownTimezone(name.to_string()))
    }

    /// Default import range around `current_year`.
    pub fn default_range(&self, current_year: i32) -> YearcalResult<YearRange> {
        YearRange::around(current_year, self.years_before, self.years_after)
    }

    /// Read only the file at `path`, without environment overrides.
    ///
    /// A missing file reads as the defaults.
    pub fn read_file(path: &Path) -> YearcalResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| YearcalError::Config(e.to_string()))
    }

    /// Save the current config to `path`.
    pub fn save(&self, path: &Path) -> YearcalResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| YearcalError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                YearcalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| YearcalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> YearcalResult<()> {
        let contents = format!(
            "\
# yearcal configuration

# Timezone events are shown in (defaults to the system timezone):
# display_timezone = \"Europe/Berlin\"

# Years before/after the current one that imports cover:
# years_before = {DEFAULT_YEARS_BEFORE}
# years_after = {DEFAULT_YEARS_AFTER}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                YearcalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| YearcalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("yearcal-config-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_file_loads_as_defaults() {
        let path = scratch_dir("defaults").join("config.toml");
        YearcalConfig::create_default_config(&path).unwrap();

        let config = YearcalConfig::load_from(&path).unwrap();
        assert_eq!(YearcalConfig::read_file(&path).unwrap(), config);

        assert_eq!(config.years_before, DEFAULT_YEARS_BEFORE);
        assert_eq!(config.years_after, DEFAULT_YEARS_AFTER);
        assert!(config.display_timezone.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let path = scratch_dir("roundtrip").join("nested").join("config.toml");
        let config = YearcalConfig {
            display_timezone: Some("Asia/Tokyo".to_string()),
            years_before: 2,
            years_after: 3,
        };
        config.save(&path).unwrap();

        let loaded = YearcalConfig::load_from(&path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(YearcalConfig::read_file(&path).unwrap(), config);
        assert_eq!(loaded.timezone_or("UTC").unwrap(), chrono_tz::Asia::Tokyo);
        assert_eq!(
            loaded.default_range(2025).unwrap(),
            YearRange::new(2023, 2028).unwrap()
        );
    }

    #[test]
    fn test_missing_file_reads_as_defaults() {
        let path = scratch_dir("missing").join("absent.toml");
        assert_eq!(
            YearcalConfig::read_file(&path).unwrap(),
            YearcalConfig::default()
        );
    }

    #[test]
    fn test_unknown_timezone_is_reported() {
        let config = YearcalConfig {
            display_timezone: Some("Mars/Olympus".to_string()),
            ..YearcalConfig::default()
        };
        assert!(matches!(
            config.timezone_or("UTC"),
            Err(YearcalError::UnknownTimezone(_))
        ));
        assert_eq!(
            YearcalConfig::default().timezone_or("UTC").unwrap(),
            chrono_tz::UTC
        );
    }
}
