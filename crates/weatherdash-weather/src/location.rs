//! Device position capability used by the mount-time probe.

use crate::types::{Coordinates, LocationError};
use async_trait::async_trait;

/// Source of the current device position
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Request the current position once.
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Geolocator that always reports a configured position
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: Coordinates,
}

impl FixedGeolocator {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Coordinates {
                latitude,
                longitude,
            },
        }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        tracing::debug!(
            "Using configured position: {}, {}",
            self.position.latitude,
            self.position.longitude
        );
        Ok(self.position)
    }
}
