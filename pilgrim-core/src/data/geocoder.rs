use async_trait::async_trait;
use thiserror::Error;

use crate::domain::post::GeoPoint;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Transport(String),

    #[error("geocoder responded with status {0}")]
    Status(u16),

    #[error("geocoder response could not be decoded: {0}")]
    Decode(String),

    #[error("no place name for the point")]
    NoPlaceName,
}

/// Обратное геокодирование: координаты в человекочитаемое название места.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, point: GeoPoint) -> Result<String, GeocodeError>;
}
