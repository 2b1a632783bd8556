//! Configuration management for the `StyleCast` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::StyleCastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `StyleCast` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleCastConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Photo search API configuration
    #[serde(default)]
    pub photos: PhotosConfig,
    /// Style/user store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default explore-page parameters
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory of static frontend assets
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    /// Password for the seeded admin account, usually supplied through the
    /// `STYLECAST_SERVER__ADMIN_PASSWORD` environment variable. Without it no
    /// admin is created and the admin routes stay unreachable.
    pub admin_password: Option<String>,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Weather API key
    pub api_key: Option<String>,
    /// Base URL for the weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Measurement units requested from the provider
    #[serde(default = "default_units")]
    pub units: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Photo search API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotosConfig {
    /// Photo API key, sent as the Authorization header
    pub api_key: Option<String>,
    /// Base URL for the photo search API
    #[serde(default = "default_photos_base_url")]
    pub base_url: String,
    /// Results requested per search
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Style/user store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store directory location
    #[serde(default = "default_store_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default explore-page parameters used when the request omits them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default city for the weather lookup
    #[serde(default = "default_city")]
    pub city: String,
    /// Default gender prefix for search queries
    #[serde(default = "default_gender")]
    pub gender: String,
}

// Default value functions
fn default_port() -> u16 {
    8888
}

fn default_assets_dir() -> String {
    "public".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_photos_base_url() -> String {
    "https://api.pexels.com/v1".to_string()
}

fn default_per_page() -> u32 {
    5
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_store_location() -> String {
    "data/stylecast".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_city() -> String {
    "toronto".to_string()
}

fn default_gender() -> String {
    "Woman".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            assets_dir: default_assets_dir(),
            admin_password: None,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            units: default_units(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_photos_base_url(),
            per_page: default_per_page(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: default_store_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            gender: default_gender(),
        }
    }
}

impl StyleCastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with STYLECAST_ prefix,
        // e.g. STYLECAST_WEATHER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("STYLECAST")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: StyleCastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stylecast").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        for (name, key) in [
            ("Weather", &self.weather.api_key),
            ("Photo", &self.photos.api_key),
        ] {
            if let Some(api_key) = key {
                if api_key.is_empty() {
                    return Err(StyleCastError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }

                if api_key.len() < 8 {
                    return Err(StyleCastError::config(format!(
                        "{name} API key appears to be invalid (too short). Please check your API key."
                    ))
                    .into());
                }

                if api_key.len() > 200 {
                    return Err(StyleCastError::config(format!(
                        "{name} API key appears to be invalid (too long). Please check your API key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, timeout) in [
            ("Weather", self.weather.timeout_seconds),
            ("Photo", self.photos.timeout_seconds),
        ] {
            if timeout == 0 || timeout > 300 {
                return Err(StyleCastError::config(format!(
                    "{name} API timeout must be between 1 and 300 seconds"
                ))
                .into());
            }
        }

        for (name, retries) in [
            ("Weather", self.weather.max_retries),
            ("Photo", self.photos.max_retries),
        ] {
            if retries > 10 {
                return Err(StyleCastError::config(format!(
                    "{name} API max retries cannot exceed 10"
                ))
                .into());
            }
        }

        // Pexels caps per_page at 80
        if self.photos.per_page == 0 || self.photos.per_page > 80 {
            return Err(
                StyleCastError::config("Photo per_page must be between 1 and 80").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(StyleCastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(StyleCastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_units = ["standard", "metric", "imperial"];
        if !valid_units.contains(&self.weather.units.as_str()) {
            return Err(StyleCastError::config(format!(
                "Invalid weather units '{}'. Must be one of: {}",
                self.weather.units,
                valid_units.join(", ")
            ))
            .into());
        }

        for (name, base_url) in [
            ("Weather", &self.weather.base_url),
            ("Photo", &self.photos.base_url),
        ] {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(StyleCastError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.store.location.is_empty() {
            return Err(StyleCastError::config("Store location cannot be empty").into());
        }

        Ok(())
    }
}
