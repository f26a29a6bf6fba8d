//! Form backend: async lookups and submissions.
//! All network work runs on the tokio runtime; results are sent back to the
//! UI thread via mpsc and applied by `WeatherFormModel::poll_channel`.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use weatherdash_core::AppError;
use weatherdash_services::{SubmissionClient, SubmissionRequest, SubmissionResponse};
use weatherdash_weather::{Geolocator, LocationQuery, WeatherProvider, WeatherResult};

/// Handles the form's async work runs against
#[derive(Clone)]
pub struct FormServices {
    pub provider: Arc<WeatherProvider>,
    pub relay: Arc<SubmissionClient>,
    /// Absent when the environment has no position source
    pub geolocator: Option<Arc<dyn Geolocator>>,
    pub runtime: tokio::runtime::Handle,
}

/// Which flow asked for a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOrigin {
    Probe,
    Submit,
}

/// Messages sent from async operations back to the UI thread
#[derive(Debug)]
pub enum FormServiceMessage {
    /// A weather lookup finished
    LookupDone {
        origin: LookupOrigin,
        query: LocationQuery,
        result: Result<WeatherResult, AppError>,
    },
    /// The position request was denied or failed
    LocationFailed(AppError),
    /// Submitted city resolved without `main.temp`; nothing was posted
    TemperatureMissing,
    /// The relay POST finished
    SubmitDone(Result<SubmissionResponse, AppError>),
}

/// Request the device position and look up weather for it.
/// Sends `LocationFailed` or `LookupDone` on the channel.
pub fn request_probe(
    tx: &Sender<FormServiceMessage>,
    services: &FormServices,
    geolocator: Arc<dyn Geolocator>,
) {
    let tx = tx.clone();
    let provider = services.provider.clone();

    services.runtime.spawn(async move {
        let position = match geolocator.current_position().await {
            Ok(position) => {
                tracing::info!(
                    "Got location: {}, {}",
                    position.latitude,
                    position.longitude
                );
                position
            }
            Err(e) => {
                tracing::warn!("Geolocation failed: {}", e);
                let _ = tx.send(FormServiceMessage::LocationFailed(e.into()));
                return;
            }
        };

        let query = LocationQuery::Coordinates(position);
        let result = provider.lookup(&query).await.map_err(AppError::from);
        let _ = tx.send(FormServiceMessage::LookupDone {
            origin: LookupOrigin::Probe,
            query,
            result,
        });
    });
}

/// Look up weather for `location_text`, then relay its temperature.
///
/// Sends `LookupDone`, followed by `TemperatureMissing` or `SubmitDone` when
/// the lookup succeeded. No POST is made unless a temperature was resolved.
pub fn request_submit(
    tx: &Sender<FormServiceMessage>,
    services: &FormServices,
    location_text: String,
) {
    let tx = tx.clone();
    let provider = services.provider.clone();
    let relay = services.relay.clone();

    services.runtime.spawn(async move {
        let query = LocationQuery::city(location_text.clone());
        let result = provider.lookup(&query).await.map_err(AppError::from);

        if let Err(e) = &result {
            tracing::warn!("Weather lookup for submission failed: {}", e);
        }
        let resolved = result.as_ref().ok().map(|weather| weather.temperature);

        let _ = tx.send(FormServiceMessage::LookupDone {
            origin: LookupOrigin::Submit,
            query,
            result,
        });

        let Some(temperature) = resolved else {
            return;
        };
        let Some(temperature) = temperature else {
            tracing::warn!("No temperature in weather data for {:?}", location_text);
            let _ = tx.send(FormServiceMessage::TemperatureMissing);
            return;
        };

        let request = SubmissionRequest {
            location_id: location_text,
            temperature,
        };
        let result = relay.submit(&request).await.map_err(AppError::from);
        if let Err(e) = &result {
            tracing::error!("Submission failed: {}", e);
        }
        let _ = tx.send(FormServiceMessage::SubmitDone(result));
    });
}
