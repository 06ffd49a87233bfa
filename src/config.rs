//! Configuration management for `skywatch`
//!
//! Loads configuration from a TOML file layered under `SKYWATCH_`-prefixed
//! environment variable overrides, and validates all settings before use.

use crate::Error;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkywatchConfig {
    /// Default location used when no `--location` override is given
    pub location: LocationConfig,
    /// Alert rule thresholds
    pub alerts: AlertsConfig,
    /// Notification channels
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Log file settings
    #[serde(default)]
    pub log: LogConfig,
}

/// The configured home location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Display name used in reports and notifications
    pub name: String,
}

/// Thresholds consumed by the rule evaluator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Rain alert triggers at this precipitation probability (percent)
    #[serde(default = "default_rain_probability_threshold")]
    pub rain_probability_threshold: u8,
    /// Wind alert triggers at this speed (km/h)
    #[serde(default = "default_wind_speed_threshold")]
    pub wind_speed_threshold: f64,
    /// Cold alert triggers below this temperature (Celsius)
    #[serde(default = "default_temperature_min")]
    pub temperature_min: f64,
    /// Feels-like alert triggers below this apparent temperature (Celsius)
    #[serde(default = "default_feels_like_min")]
    pub feels_like_min: f64,
    /// Hours of forecast examined by the rain check
    #[serde(default = "default_lookahead_hours")]
    pub lookahead_hours: usize,
}

/// Which channels receive triggered alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Send desktop notifications (macOS osascript)
    #[serde(default)]
    pub desktop: bool,
    /// Append alerts to the alert log file
    #[serde(default = "default_true")]
    pub log: bool,
}

/// Log directory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory holding the status, error, and alert logs
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

fn default_rain_probability_threshold() -> u8 {
    50
}

fn default_wind_speed_threshold() -> f64 {
    30.0
}

fn default_temperature_min() -> f64 {
    0.0
}

fn default_feels_like_min() -> f64 {
    2.0
}

fn default_lookahead_hours() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(crate::runlog::DEFAULT_LOG_DIR)
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            rain_probability_threshold: default_rain_probability_threshold(),
            wind_speed_threshold: default_wind_speed_threshold(),
            temperature_min: default_temperature_min(),
            feels_like_min: default_feels_like_min(),
            lookahead_hours: default_lookahead_hours(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            desktop: false,
            log: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
        }
    }
}

impl SkywatchConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from the given path, or the default locations:
    /// `$XDG_CONFIG_HOME/skywatch/config.toml`, then `./config.toml`
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| {
            Self::config_path()
                .filter(|p| p.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        let mut builder = Config::builder();
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("SKYWATCH")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: SkywatchConfig = settings.try_deserialize().map_err(|e| {
            Error::config(format!(
                "{e}\nConfig file: {}\nCopy config.toml.example to config.toml and fill in your location.",
                config_file.display()
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// The default configuration file path, if a config directory exists
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skywatch").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.location.latitude) {
            return Err(Error::config("location.latitude must be between -90 and 90").into());
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            return Err(Error::config("location.longitude must be between -180 and 180").into());
        }
        if self.location.name.trim().is_empty() {
            return Err(Error::config("location.name must not be empty").into());
        }
        if self.alerts.rain_probability_threshold > 100 {
            return Err(Error::config(
                "alerts.rain_probability_threshold must be between 0 and 100",
            )
            .into());
        }
        if self.alerts.wind_speed_threshold < 0.0 {
            return Err(Error::config("alerts.wind_speed_threshold must not be negative").into());
        }
        if self.alerts.lookahead_hours == 0 {
            return Err(Error::config("alerts.lookahead_hours must be at least 1").into());
        }
        Ok(())
    }
}
