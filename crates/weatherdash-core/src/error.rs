//! Centralized error types for WeatherDash.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for the status line
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Errors from the weather, location and relay crates are mapped into this
/// type by the UI layer. Use `user_message()` to get a display message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather lookup error: {0}")]
    Lookup(String),

    #[error("Location error: {0}")]
    Location(String),

    #[error("Submission error: {0}")]
    Submission(String),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Lookup(_) => "Could not get weather data",
            AppError::Location(_) => "Location unavailable. Please enter a city manually.",
            AppError::Submission(_) => "Error sending data",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
///
/// Messages never include the request URL, which may carry the API key.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        let err = self.without_url();
        if err.is_decode() {
            NetworkError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let app_err: AppError = ConfigError::Invalid("bad url".into()).into();
        assert!(matches!(app_err, AppError::Config(ConfigError::Invalid(_))));
        assert_eq!(
            app_err.user_message(),
            "Invalid configuration. Check your settings."
        );
    }

    #[test]
    fn test_flow_errors_map_to_status_lines() {
        assert_eq!(
            AppError::Lookup("404".into()).user_message(),
            "Could not get weather data"
        );
        assert_eq!(
            AppError::Submission("refused".into()).user_message(),
            "Error sending data"
        );
        assert!(AppError::Location("denied".into())
            .user_message()
            .contains("enter a city manually"));
    }

    #[test]
    fn test_network_error_display() {
        let err = NetworkError::ServerError {
            status: 404,
            message: "city not found".into(),
        };
        assert_eq!(err.to_string(), "Server error: 404 - city not found");
    }
}
