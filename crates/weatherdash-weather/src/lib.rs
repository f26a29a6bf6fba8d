//! Weather lookup for WeatherDash
//!
//! Queries the OpenWeatherMap current-weather endpoint by city name or by
//! coordinates, and exposes the device position capability used to seed the
//! first lookup.

pub mod location;
pub mod provider;
pub mod types;

pub use location::{FixedGeolocator, Geolocator};
pub use provider::WeatherProvider;
pub use types::*;
