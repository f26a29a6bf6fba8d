use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Provider endpoint for the current-weather API
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Environment prefix for runtime overrides, e.g. `WEATHERDASH_SUBMIT__ENDPOINT`
const ENV_PREFIX: &str = "WEATHERDASH";

// Values baked in at build time, used when nothing else sets them.
const BUILD_WEATHER_API_KEY: Option<&str> = option_env!("WEATHER_API_KEY");
const BUILD_SUBMIT_ENDPOINT: Option<&str> = option_env!("API_URL");

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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Submission relay settings
    #[serde(default)]
    pub submit: SubmitConfig,

    /// Fixed device position. When absent, no geolocation probe runs.
    #[serde(default)]
    pub location: Option<LocationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Provider API key (`appid` query parameter)
    #[serde(default)]
    pub api_key: String,

    /// Current-weather endpoint
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

fn default_weather_base_url() -> String {
    DEFAULT_WEATHER_BASE_URL.to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Backend URL receiving `{ locationId, temperature }` posts
    #[serde(default)]
    pub endpoint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

impl Config {
    /// Load configuration from the default file location and the environment.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration layering: defaults, optional TOML file at `path`,
    /// `WEATHERDASH_*` environment variables, then build-time fallbacks.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let mut config: Config = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;

        config.apply_build_defaults(BUILD_WEATHER_API_KEY, BUILD_SUBMIT_ENDPOINT);
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    fn apply_build_defaults(&mut self, api_key: Option<&str>, endpoint: Option<&str>) {
        if self.weather.api_key.is_empty() {
            if let Some(key) = api_key {
                self.weather.api_key = key.to_string();
            }
        }
        if self.submit.endpoint.is_empty() {
            if let Some(url) = endpoint {
                self.submit.endpoint = url.to_string();
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if self.weather.api_key.trim().is_empty() {
            result.add_warning(
                "weather.api_key",
                "No API key configured - weather lookups will be rejected",
            );
        }

        if self.submit.endpoint.trim().is_empty() {
            result.add_warning(
                "submit.endpoint",
                "No submission endpoint configured - submissions will fail",
            );
        } else {
            validate_url(&self.submit.endpoint, "submit.endpoint", &mut result);
        }

        if let Some(location) = &self.location {
            if !(-90.0..=90.0).contains(&location.latitude) {
                result.add_error("location.latitude", "Latitude must be between -90 and 90");
            }
            if !(-180.0..=180.0).contains(&location.longitude) {
                result.add_error(
                    "location.longitude",
                    "Longitude must be between -180 and 180",
                );
            }
        }

        result
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("weatherdash");

        Ok(config_dir.join("config.toml"))
    }
}

/// Validate a URL field
fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
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
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
