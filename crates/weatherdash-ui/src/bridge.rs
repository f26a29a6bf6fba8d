//! Wiring between configuration and the form's service handles.

use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use weatherdash_core::Config;
use weatherdash_services::SubmissionClient;
use weatherdash_weather::{FixedGeolocator, Geolocator, WeatherProvider};

use crate::services::FormServices;

// Static tokio runtime that lives for the duration of the application
static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

/// Get the shared tokio runtime, creating it on first use
pub fn get_or_init_runtime() -> Result<tokio::runtime::Handle> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime.handle().clone());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("weatherdash-tokio")
        .build()
        .context("Failed to create tokio runtime")?;

    Ok(RUNTIME.get_or_init(|| runtime).handle().clone())
}

/// Build the weather provider, relay client and optional geolocator from config
pub fn build_form_services(
    config: &Config,
    runtime: tokio::runtime::Handle,
) -> Result<FormServices> {
    let provider = WeatherProvider::new(
        config.weather.api_key.clone(),
        config.weather.base_url.clone(),
    )
    .context("Failed to create weather provider")?;

    let relay = SubmissionClient::new(config.submit.endpoint.clone())
        .context("Failed to create submission client")?;

    let geolocator: Option<Arc<dyn Geolocator>> = match config.location {
        Some(location) => {
            tracing::info!("Geolocation available from configured position");
            Some(Arc::new(FixedGeolocator::new(
                location.latitude,
                location.longitude,
            )))
        }
        None => {
            tracing::info!("No geolocation capability configured");
            None
        }
    };

    Ok(FormServices {
        provider: Arc::new(provider),
        relay: Arc::new(relay),
        geolocator,
        runtime,
    })
}
