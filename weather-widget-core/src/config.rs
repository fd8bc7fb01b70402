use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{location::DEFAULT_LOCATION_URL, places::DEFAULT_PLACES_URL, weather::DEFAULT_WEATHER_URL};

/// Keys baked in at compile time; the config file wins when it has one.
const BUILD_WEATHER_API_KEY: Option<&str> = option_env!("WEATHER_API_KEY");
const BUILD_PLACES_API_KEY: Option<&str> = option_env!("GOOGLE_MAPS_API_KEY");

/// OpenWeather settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self { api_key: None, base_url: DEFAULT_WEATHER_URL.to_string() }
    }
}

/// Place autocomplete settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self { api_key: None, base_url: DEFAULT_PLACES_URL.to_string() }
    }
}

/// IP geolocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub base_url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_LOCATION_URL.to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [weather]
/// api_key = "..."
///
/// [places]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub weather: WeatherConfig,
    pub places: PlacesConfig,
    pub location: LocationConfig,
}

impl Config {
    /// Load config from the platform config dir, falling back to defaults
    /// when the file doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        cfg.apply_build_defaults(BUILD_WEATHER_API_KEY, BUILD_PLACES_API_KEY);
        Ok(cfg)
    }

    /// Save config to the platform config dir.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories as needed.
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

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-widget", "weather-widget")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Weather API key, or a hint on how to set one.
    pub fn weather_api_key(&self) -> Result<&str> {
        self.weather.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather-widget configure` or build with WEATHER_API_KEY set."
            )
        })
    }

    pub fn set_weather_api_key(&mut self, api_key: String) {
        self.weather.api_key = Some(api_key);
    }

    pub fn set_places_api_key(&mut self, api_key: String) {
        self.places.api_key = Some(api_key);
    }

    fn apply_build_defaults(&mut self, weather_key: Option<&str>, places_key: Option<&str>) {
        if self.weather.api_key.is_none() {
            self.weather.api_key = weather_key.map(str::to_string);
        }
        if self.places.api_key.is_none() {
            self.places.api_key = places_key.map(str::to_string);
        }
    }
}
