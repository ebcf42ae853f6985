use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::model::Coordinate;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const DEFAULT_FORECAST_DAYS: u8 = 7;
pub const FORECAST_DAYS_RANGE: std::ops::RangeInclusive<u8> = 2..=14;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PERMISSION_TIMEOUT_SECS: u64 = 60;

/// Location settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Whether IP-based lookup is allowed; `None` means the user was never asked.
    pub auto_detect: Option<bool>,
    pub fix_timeout_secs: u64,
    /// How long to wait for an answer to the permission prompt.
    pub permission_timeout_secs: u64,
    pub fallback_latitude: f64,
    pub fallback_longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            auto_detect: None,
            fix_timeout_secs: DEFAULT_TIMEOUT_SECS,
            permission_timeout_secs: DEFAULT_PERMISSION_TIMEOUT_SECS,
            fallback_latitude: Coordinate::DEFAULT.latitude,
            fallback_longitude: Coordinate::DEFAULT.longitude,
        }
    }
}

impl LocationConfig {
    pub fn fallback(&self) -> Coordinate {
        Coordinate::new(self.fallback_latitude, self.fallback_longitude)
    }

    pub fn fix_timeout(&self) -> Duration {
        Duration::from_secs(self.fix_timeout_secs)
    }

    pub fn permission_timeout(&self) -> Duration {
        Duration::from_secs(self.permission_timeout_secs)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// weatherapi.com key.
    pub api_key: Option<String>,
    pub base_url: String,
    pub forecast_days: u8,
    pub request_timeout_secs: u64,

    /// Example TOML:
    /// [location]
    /// auto_detect = true
    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Returns the API key, or an error telling the user how to set one.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No WeatherAPI key configured.\n\
                 Hint: run `nowcast configure` and enter your API key."
            )
        })
    }

    /// Forecast length to request; today and tomorrow are both needed for
    /// the hourly window, and weatherapi.com serves at most 14 days.
    pub fn checked_forecast_days(&self) -> Result<u8> {
        if FORECAST_DAYS_RANGE.contains(&self.forecast_days) {
            Ok(self.forecast_days)
        } else {
            Err(anyhow!(
                "forecast_days = {} is out of range.\n\
                 Hint: set `forecast_days` in {} to a value between {} and {}.",
                self.forecast_days,
                Self::config_file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.toml".to_string()),
                FORECAST_DAYS_RANGE.start(),
                FORECAST_DAYS_RANGE.end(),
            ))
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "nowcast", "nowcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
