use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_fallback_latitude")]
    pub fallback_latitude: f64,
    #[serde(default = "default_fallback_longitude")]
    pub fallback_longitude: f64,
    #[serde(default = "default_fallback_spread")]
    pub fallback_spread: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_fit_padding")]
    pub fit_padding: u32,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerConfig {
    /// Port for the local status surface; disabled when absent
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

/// Credentials used when no persisted session exists at startup
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    pub role: Option<String>,
    pub email: Option<String>,
    /// Name of the environment variable holding the password
    pub password_env: Option<String>,
}

// Default value functions
fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    30
}

fn default_fallback_latitude() -> f64 {
    24.8607
}

fn default_fallback_longitude() -> f64 {
    67.0011
}

fn default_fallback_spread() -> f64 {
    2.0
}

fn default_center_latitude() -> f64 {
    30.3753
}

fn default_center_longitude() -> f64 {
    69.3451
}

fn default_zoom() -> u8 {
    10
}

fn default_fit_padding() -> u32 {
    20
}

fn default_max_zoom() -> u8 {
    15
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("trackgo-storage.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
            fallback_spread: default_fallback_spread(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_latitude: default_center_latitude(),
            center_longitude: default_center_longitude(),
            zoom: default_zoom(),
            fit_padding: default_fit_padding(),
            max_zoom: default_max_zoom(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: default_console(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            bail!("api.base_url must start with http:// or https://");
        }

        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than 0");
        }

        if self.tracking.poll_interval_secs == 0 {
            bail!("tracking.poll_interval_secs must be greater than 0");
        }

        if !(-90.0..=90.0).contains(&self.tracking.fallback_latitude) {
            bail!("tracking.fallback_latitude must be within [-90, 90]");
        }

        if !(-180.0..=180.0).contains(&self.tracking.fallback_longitude) {
            bail!("tracking.fallback_longitude must be within [-180, 180]");
        }

        if !self.tracking.fallback_spread.is_finite() || self.tracking.fallback_spread < 0.0 {
            bail!("tracking.fallback_spread must be a non-negative number");
        }

        if self.map.max_zoom == 0 {
            bail!("map.max_zoom must be greater than 0");
        }

        // Tile layer tops out at zoom 20
        if self.map.zoom > 20 || self.map.max_zoom > 20 {
            bail!("map.zoom and map.max_zoom must not exceed 20");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("server.port must be greater than 0");
            }
        }

        if let Some(role) = &self.auth.role {
            if role != "admin" && role != "user" {
                bail!("Invalid auth role '{}'. Must be one of: admin, user", role);
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}
