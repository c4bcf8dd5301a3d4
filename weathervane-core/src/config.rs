use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use std::{fs, path::PathBuf};
use url::Url;

use crate::model::normalize_key;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Top-level configuration, stored on disk as TOML and handed to the
/// orchestrator at construction. Immutable once the orchestrator holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key. Absent until `configure` has run.
    pub api_key: Option<String>,

    /// Endpoint the request URL is built from.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Cache entry lifetime. An entry whose age reaches this value is stale.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Ordered list of cities the rotation cycles through.
    #[serde(default = "default_cities")]
    pub cities: Vec<String>,

    /// City shown first; falls back to the first entry of `cities`.
    #[serde(default)]
    pub default_city: Option<String>,

    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// When set, rotating away from a city drops its cache entry so coming
    /// back forces a fresh fetch. Off by default: one cache entry per city.
    #[serde(default)]
    pub refresh_on_rotation: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_ttl_seconds() -> u64 {
    300
}

fn default_cities() -> Vec<String> {
    vec!["London".to_string(), "Paris".to_string(), "Tokyo".to_string()]
}

fn default_request_timeout_seconds() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            ttl_seconds: default_ttl_seconds(),
            cities: default_cities(),
            default_city: None,
            request_timeout_seconds: default_request_timeout_seconds(),
            refresh_on_rotation: false,
        }
    }
}

impl Config {
    /// Check every invariant the orchestrator relies on. Called once at
    /// orchestrator construction; there is no runtime reconfiguration.
    pub fn validate(&self) -> Result<()> {
        if self.ttl_seconds == 0 {
            return Err(anyhow!("ttl_seconds must be greater than zero"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than zero"));
        }

        if self.cities.is_empty() {
            return Err(anyhow!(
                "No cities configured.\n\
                 Hint: add at least one city to `cities` in the config file."
            ));
        }

        let mut seen = HashSet::new();
        for city in &self.cities {
            let normalized = normalize_key(city);
            if normalized.is_empty() {
                return Err(anyhow!("City names must not be blank"));
            }
            if !seen.insert(normalized) {
                return Err(anyhow!("Duplicate city in configuration: '{}'", city.trim()));
            }
        }

        Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base_url: {}", self.base_url))?;

        Ok(())
    }

    /// API key, or a configuration error telling the user how to get one in.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `weathervane configure` and enter your OpenWeather API key."
            )
        })
    }

    /// The city requested first: the configured default, else the first of
    /// the rotation list. Normalized.
    pub fn starting_city(&self) -> String {
        let city = self
            .default_city
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.cities.first().map(String::as_str))
            .unwrap_or_default();

        normalize_key(city)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Load config from disk, or return the defaults if no file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
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
        let dirs = ProjectDirs::from("dev", "weathervane", "weathervane-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
