use std::sync::mpsc::{self, Receiver, Sender};

use weatherdash_core::AppError;
use weatherdash_weather::WeatherResult;

use crate::services::{self, FormServiceMessage, FormServices, LookupOrigin};

pub const STATUS_DETECTING: &str = "Detecting your location...";
pub const STATUS_FETCHING: &str = "Fetching weather...";
pub const STATUS_EMPTY_LOCATION: &str = "Please enter a location";
pub const STATUS_PROBE_LOOKUP_FAILED: &str = "Failed to fetch weather data";
pub const STATUS_TEMPERATURE_MISSING: &str = "Temperature data not available";
pub const STATUS_SUBMITTED: &str = "Success!";

/// Everything the presentation layer reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    /// Text bound to the location input
    pub location_text: String,
    /// Latest status line; overwritten on every transition
    pub status: String,
    /// Last successful lookup. Never cleared by a later failure.
    pub weather: Option<WeatherResult>,
}

/// The weather form: input text, status line and last weather result.
///
/// Owned by one UI thread. Requests run on the runtime in `FormServices`;
/// call `poll_channel` to apply their results.
pub struct WeatherFormModel {
    state: FormState,
    services: FormServices,
    mounted: bool,
    in_flight: usize,
    tx: Sender<FormServiceMessage>,
    rx: Receiver<FormServiceMessage>,
}

impl WeatherFormModel {
    pub fn new(services: FormServices) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: FormState::default(),
            services,
            mounted: false,
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// True while a probe or submission has not reported its final message
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn set_location_text(&mut self, text: impl Into<String>) {
        self.state.location_text = text.into();
    }

    /// Run the one-time geolocation probe. Later calls do nothing.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        let Some(geolocator) = self.services.geolocator.clone() else {
            self.fail_location(AppError::Location(
                "no geolocation capability".to_string(),
            ));
            return;
        };

        self.state.status = STATUS_DETECTING.to_string();
        self.in_flight += 1;
        services::request_probe(&self.tx, &self.services, geolocator);
    }

    /// Look up the typed city and relay its temperature.
    ///
    /// Every call starts a new lookup; nothing dedupes or cancels earlier ones.
    /// The text is sent as typed; whitespace only counts for the empty check.
    pub fn submit(&mut self) {
        if self.state.location_text.trim().is_empty() {
            self.state.status = STATUS_EMPTY_LOCATION.to_string();
            return;
        }

        self.state.status = STATUS_FETCHING.to_string();
        self.in_flight += 1;
        services::request_submit(&self.tx, &self.services, self.state.location_text.clone());
    }

    /// Apply every pending service result. Returns true if state changed.
    pub fn poll_channel(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
            changed = true;
        }
        changed
    }

    fn apply(&mut self, msg: FormServiceMessage) {
        match msg {
            FormServiceMessage::LookupDone {
                origin,
                query,
                result,
            } => match result {
                Ok(weather) => {
                    tracing::info!("Weather data fetched for {}", weather.city_name);
                    if query.is_coordinates() {
                        self.state.location_text = weather.city_name.clone();
                    }
                    self.state.weather = Some(weather);
                    if origin == LookupOrigin::Probe {
                        self.state.status.clear();
                        self.finish();
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to fetch weather: {}", e);
                    self.state.status = match origin {
                        LookupOrigin::Probe => STATUS_PROBE_LOOKUP_FAILED.to_string(),
                        LookupOrigin::Submit => e.user_message().to_string(),
                    };
                    self.finish();
                }
            },
            FormServiceMessage::LocationFailed(e) => {
                self.fail_location(e);
                self.finish();
            }
            FormServiceMessage::TemperatureMissing => {
                self.state.status = STATUS_TEMPERATURE_MISSING.to_string();
                self.finish();
            }
            FormServiceMessage::SubmitDone(result) => {
                self.state.status = match result {
                    Ok(response) => {
                        tracing::info!("Submission answered with status {}", response.status);
                        response
                            .message
                            .filter(|m| !m.is_empty())
                            .unwrap_or_else(|| STATUS_SUBMITTED.to_string())
                    }
                    Err(e) => e.user_message().to_string(),
                };
                self.finish();
            }
        }
    }

    fn fail_location(&mut self, e: AppError) {
        tracing::info!("Geolocation unavailable: {}", e);
        self.state.status = e.user_message().to_string();
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use weatherdash_services::SubmissionClient;
    use weatherdash_weather::{
        Coordinates, FixedGeolocator, Geolocator, LocationError, WeatherProvider,
    };
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MANUAL_ENTRY: &str = "Location unavailable. Please enter a city manually.";

    struct DeniedGeolocator;

    #[async_trait]
    impl Geolocator for DeniedGeolocator {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    fn marietta_body(temp: f64) -> serde_json::Value {
        serde_json::json!({
            "weather": [{"description": "clear sky", "icon": "01d"}],
            "main": {"temp": temp},
            "name": "Marietta"
        })
    }

    fn services_for(
        weather: &MockServer,
        relay: &MockServer,
        geolocator: Option<Arc<dyn Geolocator>>,
    ) -> FormServices {
        FormServices {
            provider: Arc::new(
                WeatherProvider::new("test-key", format!("{}/weather", weather.uri())).unwrap(),
            ),
            relay: Arc::new(SubmissionClient::new(format!("{}/submit", relay.uri())).unwrap()),
            geolocator,
            runtime: tokio::runtime::Handle::current(),
        }
    }

    async fn settle(model: &mut WeatherFormModel) {
        for _ in 0..500 {
            model.poll_channel();
            if !model.loading() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("form did not settle: {:?}", model.state());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_submit_looks_up_then_posts() {
        // One server plays both roles so request order can be checked
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Marietta"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(marietta_body(72.3)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "Saved!"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut model = WeatherFormModel::new(services_for(&server, &server, None));
        model.set_location_text("Marietta");
        model.submit();
        assert_eq!(model.state().status, STATUS_FETCHING);
        settle(&mut model).await;

        let state = model.state();
        assert_eq!(state.status, "Saved!");
        let result = state.weather.as_ref().unwrap();
        assert_eq!(result.city_name, "Marietta");
        assert_eq!(result.temperature, Some(72.3));
        assert_eq!(state.location_text, "Marietta");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method.as_str(), "GET");
        assert_eq!(requests[1].method.as_str(), "POST");
        let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"locationId": "Marietta", "temperature": 72.3})
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_location_id_is_posted_as_typed() {
        let weather = MockServer::start().await;
        let relay = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", " Marietta "))
            .respond_with(ResponseTemplate::new(200).set_body_json(marietta_body(72.3)))
            .expect(1)
            .mount(&weather)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&relay)
            .await;

        let mut model = WeatherFormModel::new(services_for(&weather, &relay, None));
        model.set_location_text(" Marietta ");
        model.submit();
        settle(&mut model).await;

        let requests = relay.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"locationId": " Marietta ", "temperature": 72.3})
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_submit_without_message_shows_default() {
        let weather = MockServer::start().await;
        let relay = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(marietta_body(20.0)))
            .mount(&weather)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&relay)
            .await;

        let mut model = WeatherFormModel::new(services_for(&weather, &relay, None));
        model.set_location_text("Marietta");
        model.submit();
        settle(&mut model).await;

        assert_eq!(model.state().status, STATUS_SUBMITTED);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_temperature_skips_post() {
        let weather = MockServer::start().await;
        let relay = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Fogtown",
                "weather": [{"description": "mist", "icon": "50d"}]
            })))
            .mount(&weather)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&relay)
            .await;

        let mut model = WeatherFormModel::new(services_for(&weather, &relay, None));
        model.set_location_text("Fogtown");
        model.submit();
        settle(&mut model).await;

        assert_eq!(model.state().status, STATUS_TEMPERATURE_MISSING);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_lookup_keeps_previous_result() {
        let weather = MockServer::start().await;
        let relay = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "Marietta"))
            .respond_with(ResponseTemplate::new(200).set_body_json(marietta_body(18.5)))
            .mount(&weather)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "Atlantis"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&weather)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})))
            .expect(1)
            .mount(&relay)
            .await;

        let mut model = WeatherFormModel::new(services_for(&weather, &relay, None));
        model.set_location_text("Marietta");
        model.submit();
        settle(&mut model).await;

        model.set_location_text("Atlantis");
        model.submit();
        settle(&mut model).await;

        let state = model.state();
        assert_eq!(state.status, "Could not get weather data");
        assert_eq!(state.weather.as_ref().unwrap().city_name, "Marietta");
        assert_eq!(state.location_text, "Atlantis");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_post_transport_failure_keeps_result() {
        let weather = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(marietta_body(72.3)))
            .mount(&weather)
            .await;

        let relay = MockServer::start().await;
        let mut services = services_for(&weather, &relay, None);
        // Nothing listens on the discard port
        services.relay = Arc::new(SubmissionClient::new("http://127.0.0.1:9/submit").unwrap());

        let mut model = WeatherFormModel::new(services);
        model.set_location_text("Marietta");
        model.submit();
        settle(&mut model).await;

        let state = model.state();
        assert_eq!(state.status, "Error sending data");
        assert_eq!(state.weather.as_ref().unwrap().temperature, Some(72.3));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_location_makes_no_requests() {
        let weather = MockServer::start().await;
        let relay = MockServer::start().await;

        let mut model = WeatherFormModel::new(services_for(&weather, &relay, None));
        model.set_location_text("   ");
        model.submit();

        assert_eq!(model.state().status, STATUS_EMPTY_LOCATION);
        assert!(!model.loading());
        assert!(weather.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_probe_overwrites_location_text() {
        let weather = MockServer::start().await;
        let relay = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("lat", "33.9526"))
            .and(query_param("lon", "-84.5499"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(marietta_body(72.3)))
            .expect(1)
            .mount(&weather)
            .await;

        let geolocator: Arc<dyn Geolocator> = Arc::new(FixedGeolocator::new(33.9526, -84.5499));
        let mut model = WeatherFormModel::new(services_for(&weather, &relay, Some(geolocator)));
        model.mount();
        assert_eq!(model.state().status, STATUS_DETECTING);
        settle(&mut model).await;

        let state = model.state();
        assert_eq!(state.location_text, "Marietta");
        assert_eq!(state.status, "");
        assert_eq!(state.weather.as_ref().unwrap().temperature, Some(72.3));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_probe_runs_once() {
        let weather = MockServer::start().await;
        let relay = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(marietta_body(60.0)))
            .expect(1)
            .mount(&weather)
            .await;

        let geolocator: Arc<dyn Geolocator> = Arc::new(FixedGeolocator::new(10.0, 20.0));
        let mut model = WeatherFormModel::new(services_for(&weather, &relay, Some(geolocator)));
        model.mount();
        model.mount();
        settle(&mut model).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_probe_lookup_failure() {
        let weather = MockServer::start().await;
        let relay = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "cod": 401,
                "message": "Invalid API key"
            })))
            .mount(&weather)
            .await;

        let geolocator: Arc<dyn Geolocator> = Arc::new(FixedGeolocator::new(10.0, 20.0));
        let mut model = WeatherFormModel::new(services_for(&weather, &relay, Some(geolocator)));
        model.mount();
        settle(&mut model).await;

        assert_eq!(model.state().status, STATUS_PROBE_LOOKUP_FAILED);
        assert!(model.state().weather.is_none());
        assert_eq!(model.state().location_text, "");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_denied_geolocation_prompts_for_city() {
        let weather = MockServer::start().await;
        let relay = MockServer::start().await;

        let geolocator: Arc<dyn Geolocator> = Arc::new(DeniedGeolocator);
        let mut model = WeatherFormModel::new(services_for(&weather, &relay, Some(geolocator)));
        model.mount();
        settle(&mut model).await;

        assert_eq!(model.state().status, MANUAL_ENTRY);
        assert!(weather.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_geolocation_prompts_for_city() {
        let weather = MockServer::start().await;
        let relay = MockServer::start().await;

        let mut model = WeatherFormModel::new(services_for(&weather, &relay, None));
        model.mount();

        assert_eq!(model.state().status, MANUAL_ENTRY);
        assert!(!model.loading());
        assert!(weather.received_requests().await.unwrap().is_empty());
    }
}
