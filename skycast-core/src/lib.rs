//! Core library for the SkyCast weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather HTTP client (geocoding, current conditions, forecast)
//! - Input normalization and the pure forecast transformer
//! - Search history and the dashboard pipeline orchestrator
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod locate;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod transform;

pub use api::OpenWeatherClient;
pub use config::Config;
pub use error::QueryError;
pub use history::{HistoryStore, JsonFileHistoryStore, SearchHistory};
pub use locate::{Coordinates, LocationProvider, StaticCoordinates};
pub use model::{
    CurrentConditions, DailyPoint, ForecastBundle, HourlyPoint, Location, WeatherView,
};
pub use pipeline::{Dashboard, Notice, NoticeKind, Phase};
