use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    location::DEFAULT_IP_API_URL,
    provider::openweather::DEFAULT_URL_TEMPLATE,
    retry::{DEFAULT_LOCATION_ATTEMPTS, RetryPolicy},
};

/// Environment variable that overrides the stored OpenWeather API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [location]
/// retries = 3
/// retry_delay_secs = 1.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,
    pub location: LocationConfig,
    pub weather: WeatherConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    /// IP geolocation endpoint.
    pub url: String,
    /// Total attempts before giving up.
    pub retries: u32,
    pub retry_delay_secs: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_IP_API_URL.to_string(),
            retries: DEFAULT_LOCATION_ATTEMPTS,
            retry_delay_secs: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    /// Request URL with `{latitude}`, `{longitude}` and `{api_key}` placeholders.
    pub url_template: String,
    /// Total attempts; the default of 1 keeps the quota-bound API from being hammered.
    pub retries: u32,
    pub retry_delay_secs: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            retries: 1,
            retry_delay_secs: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl Config {
    /// Load config from disk and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_with(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return defaults if the file doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
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
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply overrides from an environment lookup (`std::env::var` in production).
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
    }

    /// Returns the API key, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Weather URL template with the API key filled in; coordinates stay as placeholders.
    pub fn weather_url_template(&self) -> Result<String> {
        let template = &self.weather.url_template;
        if !template.contains("{latitude}") || !template.contains("{longitude}") {
            bail!("Weather URL template must contain {{latitude}} and {{longitude}} placeholders");
        }

        if !template.contains("{api_key}") {
            return Ok(template.clone());
        }

        let api_key = self.api_key().ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather configure` or set the {API_KEY_ENV} environment variable."
            )
        })?;

        Ok(template.replace("{api_key}", api_key))
    }

    pub fn location_retry(&self) -> Result<RetryPolicy> {
        retry_policy(self.location.retries, self.location.retry_delay_secs)
            .context("Invalid [location] retry settings")
    }

    pub fn weather_retry(&self) -> Result<RetryPolicy> {
        retry_policy(self.weather.retries, self.weather.retry_delay_secs)
            .context("Invalid [weather] retry settings")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

fn retry_policy(attempts: u32, delay_secs: f64) -> Result<RetryPolicy> {
    if attempts == 0 {
        bail!("retries must be at least 1");
    }
    let delay = Duration::try_from_secs_f64(delay_secs).with_context(|| {
        format!("retry_delay_secs must be a non-negative number, got {delay_secs}")
    })?;

    Ok(RetryPolicy::new(attempts, delay))
}
