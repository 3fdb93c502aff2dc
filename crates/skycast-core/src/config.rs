use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skycast_recommend::SubscriptionTier;
use skycast_weather::{Location, TemperatureUnit, DEFAULT_API_URL};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AppError, ConfigError};

/// Environment variable overriding the configured user id
pub const USER_ID_ENV: &str = "SKYCAST_USER_ID";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Signed-in user; recommendation history is only kept when set
    #[serde(default)]
    pub user_id: Option<String>,

    /// Weather settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Recommendation settings
    #[serde(default)]
    pub recommendations: RecommendationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Temperature unit preference
    pub temperature_unit: TemperatureUnit,

    /// Open-Meteo compatible API root
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Location used when none is given on the command line
    #[serde(default)]
    pub default_location: Option<LocationConfig>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::Auto,
            api_url: default_api_url(),
            default_location: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Identifier recorded in recommendation history
    #[serde(default = "default_location_id")]
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_location_id() -> String {
    "default".to_string()
}

impl LocationConfig {
    pub fn to_location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
            city_name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsConfig {
    /// Subscription tier used for gating
    #[serde(default)]
    pub tier: SubscriptionTier,

    /// Items per gated list shown on the free tier
    #[serde(default = "default_free_tier_limit")]
    pub free_tier_limit: usize,

    /// Records returned by history queries
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// SQLite file, relative to the config directory
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_free_tier_limit() -> usize {
    2
}

fn default_history_limit() -> usize {
    50
}

fn default_database_file() -> String {
    "recommendations.db".to_string()
}

impl Default for RecommendationsConfig {
    fn default() -> Self {
        Self {
            tier: SubscriptionTier::default(),
            free_tier_limit: default_free_tier_limit(),
            history_limit: default_history_limit(),
            database_file: default_database_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");

        Self {
            config_dir,
            user_id: None,
            weather: WeatherConfig::default(),
            recommendations: RecommendationsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the platform config directory, creating a default if it
    /// doesn't exist. `SKYCAST_USER_ID` overrides `user_id`.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(user_id) = std::env::var(USER_ID_ENV) {
            config.user_id = Some(user_id);
        }
        Ok(config)
    }

    /// Load configuration from `path`, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let mut config = Self::default();
            if let Some(parent) = path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::load()?.validated()
    }

    /// Validate, failing with `ConfigError::Invalid` on any error and logging warnings.
    pub fn validated(self) -> Result<(Self, ValidationResult)> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(AppError::Config(ConfigError::Invalid(validation.error_summary())).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((self, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_url, "weather.api_url", &mut result);

        if let Some(location) = &self.weather.default_location {
            if !(-90.0..=90.0).contains(&location.latitude) {
                result.add_error(
                    "weather.default_location.latitude",
                    format!("Latitude must be between -90 and 90, got {}", location.latitude),
                );
            }
            if !(-180.0..=180.0).contains(&location.longitude) {
                result.add_error(
                    "weather.default_location.longitude",
                    format!("Longitude must be between -180 and 180, got {}", location.longitude),
                );
            }
        } else {
            result.add_warning(
                "weather.default_location",
                "No default location - weather must be given on the command line",
            );
        }

        if self.recommendations.history_limit == 0 {
            result.add_error(
                "recommendations.history_limit",
                "History limit must be greater than 0",
            );
        }

        if self.recommendations.free_tier_limit == 0 {
            result.add_warning(
                "recommendations.free_tier_limit",
                "Free tier shows no activity, clothing or transportation items",
            );
        }

        if self.recommendations.database_file.trim().is_empty() {
            result.add_error("recommendations.database_file", "Database file name is empty");
        }

        if self.user_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            result.add_warning("user_id", "User id is blank - history will not be recorded");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Path of the recommendation database.
    pub fn database_path(&self) -> PathBuf {
        self.config_dir.join(&self.recommendations.database_file)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_missing_location_is_warning() {
        let result = Config::default().validate();
        assert!(result.warnings.iter().any(|w| w.field == "weather.default_location"));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.weather.api_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.api_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.weather.api_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_out_of_range_location() {
        let mut config = Config::default();
        config.weather.default_location = Some(LocationConfig {
            id: "home".to_string(),
            latitude: 120.0,
            longitude: 13.4,
            name: None,
        });
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "weather.default_location.latitude"));
    }

    #[test]
    fn test_zero_history_limit() {
        let mut config = Config::default();
        config.recommendations.history_limit = 0;
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_validated_rejects_invalid_config_as_config_error() {
        let mut config = Config::default();
        config.recommendations.history_limit = 0;

        let err = config.validated().unwrap_err();
        let app_err = err.downcast_ref::<AppError>().unwrap();
        assert!(matches!(
            app_err,
            AppError::Config(ConfigError::Invalid(msg)) if msg.contains("recommendations.history_limit")
        ));
        assert_eq!(app_err.user_message(), "Invalid configuration. Check your settings.");
    }

    #[test]
    fn test_validated_keeps_warnings() {
        let (config, validation) = Config::default().validated().unwrap();
        assert_eq!(config.recommendations.history_limit, 50);
        assert!(validation.is_valid());
        assert!(!validation.warnings.is_empty());
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert_eq!(summary, "field1: error1; field2: error2");
    }

    #[test]
    fn test_load_from_writes_defaults_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.config_dir, dir.path());
        assert_eq!(created.database_path(), dir.path().join("recommendations.db"));

        let mut edited = created.clone();
        edited.user_id = Some("user-1".to_string());
        edited.recommendations.tier = SubscriptionTier::Premium;
        edited.weather.temperature_unit = TemperatureUnit::Fahrenheit;
        edited.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.user_id.as_deref(), Some("user-1"));
        assert_eq!(reloaded.recommendations.tier, SubscriptionTier::Premium);
        assert_eq!(reloaded.weather.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
config_dir = "/tmp/skycast"

[weather]
temperature_unit = "celsius"

[weather.default_location]
latitude = 52.52
longitude = 13.41
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.weather.api_url, DEFAULT_API_URL);
        let location = config.weather.default_location.unwrap();
        assert_eq!(location.id, "default");
        assert_eq!(location.to_location().latitude, 52.52);
        assert_eq!(config.recommendations.free_tier_limit, 2);
        assert_eq!(config.recommendations.tier, SubscriptionTier::Free);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_dir = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
