//! Current-weather lookup client.

use crate::types::{LocationQuery, WeatherError, WeatherResult};
use reqwest::Client;
use std::sync::Arc;
use tracing::instrument;
use url::Url;
use weatherdash_core::{NetworkError, ReqwestErrorExt};

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl WeatherProvider {
    /// Create a provider for the given endpoint. No request timeout is set;
    /// an in-flight lookup runs until the transport gives up.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self {
            client: Arc::new(client),
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Build the provider URL for a query.
    ///
    /// City names are percent-encoded; coordinates are sent as their plain
    /// decimal representation.
    pub fn build_url(&self, query: &LocationQuery) -> Result<Url, WeatherError> {
        let units = query.units().as_query();
        let params: Vec<(&str, String)> = match query {
            LocationQuery::City(city) => vec![
                ("q", city.clone()),
                ("appid", self.api_key.clone()),
                ("units", units.to_string()),
            ],
            LocationQuery::Coordinates(coords) => vec![
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", units.to_string()),
            ],
        };

        Url::parse_with_params(&self.base_url, &params)
            .map_err(|e| WeatherError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }

    /// Fetch and parse the current weather for `query`.
    ///
    /// Transport failures and non-success statuses are returned as
    /// `WeatherError::Network`; an unreadable body as `WeatherError::Parse`.
    #[instrument(skip(self), level = "info")]
    pub async fn lookup(&self, query: &LocationQuery) -> Result<WeatherResult, WeatherError> {
        let url = self.build_url(query)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API returned status {}", status);
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response.text().await.map_err(|e| e.into_network_error())?;
        let result = WeatherResult::from_json(&body, query.units())?;

        tracing::debug!(city = %result.city_name, temperature = ?result.temperature, "Weather parsed");
        Ok(result)
    }
}
