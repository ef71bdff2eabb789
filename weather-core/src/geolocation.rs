use async_trait::async_trait;
use thiserror::Error;

use crate::{config::GeolocationConfig, model::Coordinates};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation is not available")]
    Unavailable,

    #[error("geolocation permission denied")]
    PermissionDenied,
}

/// One-shot source of the user's position.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Position taken from configuration or command-line flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfiguredLocator {
    enabled: bool,
    position: Option<Coordinates>,
}

impl ConfiguredLocator {
    pub fn new(enabled: bool, position: Option<Coordinates>) -> Self {
        Self { enabled, position }
    }

    /// Explicitly supplied coordinates are always permitted.
    pub fn fixed(position: Coordinates) -> Self {
        Self::new(true, Some(position))
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &GeolocationConfig) -> Self {
        Self::new(cfg.enabled, cfg.coordinates())
    }
}

#[async_trait]
impl Geolocator for ConfiguredLocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        match (self.enabled, self.position) {
            (_, None) => Err(GeolocationError::Unavailable),
            (false, Some(_)) => Err(GeolocationError::PermissionDenied),
            (true, Some(pos)) => Ok(pos),
        }
    }
}
