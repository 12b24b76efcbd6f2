use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    city::{City, DEFAULT_CITIES, resolve_cities},
    dashboard::DEFAULT_ALERT_THRESHOLD_C,
    model::{DEFAULT_FORECAST_HOURS, MAX_FORECAST_HOURS, MIN_FORECAST_HOURS},
    provider::ProviderId,
};

pub const MIN_REFRESH_SECS: u64 = 10;
pub const MAX_REFRESH_SECS: u64 = 600;
pub const DEFAULT_REFRESH_SECS: u64 = 60;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_provider = "met-no"
/// user_agent = "windchill/0.1 me@example.com"
/// default_cities = ["Oslo", "Tromsø"]
/// hours = 48
/// refresh_secs = 120
/// alert_threshold_c = -25.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Optional default provider id, e.g. "open-meteo" or "met-no".
    pub default_provider: Option<String>,

    /// Identifying User-Agent, required by MET Norway.
    pub user_agent: Option<String>,

    pub default_cities: Vec<String>,

    pub hours: Option<usize>,

    pub refresh_secs: Option<u64>,

    pub alert_threshold_c: Option<f64>,
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId, falling
    /// back to Open-Meteo which needs no setup.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s).with_context(|| {
                "Invalid `default_provider` in config.\n\
                 Hint: run `windchill configure` to pick a supported provider."
            }),
            None => Ok(ProviderId::OpenMeteo),
        }
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Configured cities, or the built-in defaults when none are set.
    pub fn cities(&self) -> Result<Vec<City>> {
        if self.default_cities.is_empty() {
            resolve_cities(DEFAULT_CITIES)
        } else {
            resolve_cities(self.default_cities.as_slice())
        }
    }

    pub fn hours(&self) -> usize {
        self.hours
            .unwrap_or(DEFAULT_FORECAST_HOURS)
            .clamp(MIN_FORECAST_HOURS, MAX_FORECAST_HOURS)
    }

    pub fn refresh_secs(&self) -> u64 {
        self.refresh_secs
            .unwrap_or(DEFAULT_REFRESH_SECS)
            .clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS)
    }

    pub fn alert_threshold_c(&self) -> f64 {
        self.alert_threshold_c.unwrap_or(DEFAULT_ALERT_THRESHOLD_C)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
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
        let dirs = ProjectDirs::from("dev", "windchill", "windchill")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
