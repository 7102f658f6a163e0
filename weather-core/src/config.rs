use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::ProviderId;

/// Configuration for a keyed provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy allows one request per second.
    pub rate_limit_delay_ms: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            rate_limit_delay_ms: 1000,
        }
    }
}

// `Default` is only reached when a section is present without `base_url`;
// `Config::from_toml` then restores the per-endpoint URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenMeteoConfig {
    pub historical_base_url: String,
    pub years_for_average: i32,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            historical_base_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            years_for_average: 10,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// user_agent = "gameday-weather (me@example.com)"
///
/// [nws]
/// base_url = "https://api.weather.gov"
///
/// [providers.tomorrow]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub nominatim: NominatimConfig,
    pub geocode_maps: EndpointConfig,
    pub nws: EndpointConfig,
    pub tomorrow: EndpointConfig,
    pub open_meteo: OpenMeteoConfig,
    pub sunrise_sunset: EndpointConfig,
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: "gameday-weather (contact@example.com)".to_string(),
            timeout_secs: 30,
            nominatim: NominatimConfig::default(),
            geocode_maps: EndpointConfig::with_base("https://geocode.maps.co"),
            nws: EndpointConfig::with_base("https://api.weather.gov"),
            tomorrow: EndpointConfig::with_base("https://api.tomorrow.io/v4"),
            open_meteo: OpenMeteoConfig::default(),
            sunrise_sunset: EndpointConfig::with_base("https://api.sunrisesunset.io"),
            providers: HashMap::new(),
        }
    }
}

impl EndpointConfig {
    fn with_base(url: &str) -> Self {
        Self {
            base_url: url.to_string(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut cfg: Config = toml::from_str(contents)?;
        cfg.fill_blank_endpoints();
        Ok(cfg)
    }

    fn fill_blank_endpoints(&mut self) {
        let defaults = Self::default();
        for (endpoint, fallback) in [
            (&mut self.geocode_maps, defaults.geocode_maps),
            (&mut self.nws, defaults.nws),
            (&mut self.tomorrow, defaults.tomorrow),
            (&mut self.sunrise_sunset, defaults.sunrise_sunset),
        ] {
            if endpoint.base_url.trim().is_empty() {
                *endpoint = fallback;
            }
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "gameday-weather", "gameday-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers
            .insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    /// Returns the API key for a provider, ignoring blank keys.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers
            .get(provider_id.as_str())
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }
}
