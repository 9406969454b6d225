use async_trait::async_trait;

use crate::error::QueryError;

/// Device coordinates, resolved outside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Source of device coordinates for the startup geolocation path.
///
/// The pipeline never talks to positioning hardware itself: the CLI supplies
/// explicit coordinates and tests supply fakes.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current(&self) -> Result<Coordinates, QueryError>;
}

/// Fixed coordinates, e.g. from command-line flags.
#[derive(Debug, Clone, Copy)]
pub struct StaticCoordinates(pub Coordinates);

#[async_trait]
impl LocationProvider for StaticCoordinates {
    async fn current(&self) -> Result<Coordinates, QueryError> {
        Ok(self.0)
    }
}
