use serde::{Deserialize, Serialize};
use weatherdash_core::{AppError, NetworkError};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Measurement system requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the provider's `units` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    /// Temperature label shown next to the value
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }
}

/// Geographic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Input to a single weather lookup: a city name or a position, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        Self::Coordinates(Coordinates {
            latitude,
            longitude,
        })
    }

    /// City lookups are metric, coordinate lookups are imperial.
    pub fn units(&self) -> Units {
        match self {
            Self::City(_) => Units::Metric,
            Self::Coordinates(_) => Units::Imperial,
        }
    }

    pub fn is_coordinates(&self) -> bool {
        matches!(self, Self::Coordinates(_))
    }
}

/// Parsed weather shown on the form's card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    /// Provider-resolved city name
    pub city_name: String,
    /// `main.temp`; absent when the provider omits it
    pub temperature: Option<f64>,
    /// `weather[0].description`
    pub description: Option<String>,
    /// `weather[0].icon`
    pub icon: Option<String>,
    /// Units the lookup was made in
    pub units: Units,
}

impl WeatherResult {
    /// Parse a provider response body.
    pub fn from_json(body: &str, units: Units) -> Result<Self, WeatherError> {
        let response: ProviderResponse =
            serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;
        Ok(response.into_result(units))
    }

    /// Image URL for the condition icon, if the provider sent one
    pub fn icon_url(&self) -> Option<String> {
        self.icon
            .as_deref()
            .filter(|icon| !icon.is_empty())
            .map(|icon| format!("{}/{}@2x.png", ICON_BASE_URL, icon))
    }
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    main: Option<ProviderMain>,
    #[serde(default)]
    weather: Vec<ProviderCondition>,
}

#[derive(Debug, Deserialize)]
struct ProviderMain {
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProviderCondition {
    description: Option<String>,
    icon: Option<String>,
}

impl ProviderResponse {
    fn into_result(self, units: Units) -> WeatherResult {
        let condition = self.weather.into_iter().next();
        let (description, icon) = match condition {
            Some(c) => (c.description, c.icon),
            None => (None, None),
        };

        WeatherResult {
            city_name: self.name,
            temperature: self.main.and_then(|m| m.temp),
            description,
            icon,
            units,
        }
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        AppError::Lookup(e.to_string())
    }
}

impl From<LocationError> for AppError {
    fn from(e: LocationError) -> Self {
        AppError::Location(e.to_string())
    }
}
