use serde::{Deserialize, Serialize};

/// A place resolved by the geocoder.
///
/// `resolved_name` is the geocoder's authoritative spelling. It supersedes
/// whatever the user typed, both for display and for refresh replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub resolved_name: String,
    pub country: Option<String>,
}

/// Current conditions, mapped 1:1 from the weather endpoint.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country_code: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub min_c: f64,
    pub max_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: f64,
    pub visibility_m: u32,
    pub sunrise_epoch: i64,
    pub sunset_epoch: i64,
    pub condition_main: String,
    pub condition_description: String,
    pub condition_icon: String,
}

/// One 3-hour slot of the forecast feed, hourly view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub epoch: i64,
    pub time_label: String,
    pub temperature_c: f64,
    pub condition_main: String,
    /// Probability of precipitation in `0.0..=1.0`; 0 when the feed omits it.
    pub precipitation_chance: f64,
    /// The 3-hour feed carries no UV data; always 0.
    pub uv_index: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

/// One representative sample per day, taken straight from the 3-hour feed.
/// The instantaneous sample stands in for the day/min/max temperatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub epoch: i64,
    pub temp_day_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub condition_main: String,
    pub condition_description: String,
    pub condition_icon: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

/// Forecast view-model. Replaced wholesale on every successful run, never
/// mutated field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
    /// Fetch moment, clock-formatted for the dashboard header.
    pub display_time: String,
    pub sunrise_epoch: i64,
    pub sunset_epoch: i64,
}

/// The atomic publication unit: current conditions plus forecast from one
/// fetch cycle. The two are never mixed across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherView {
    pub current: CurrentConditions,
    pub forecast: ForecastBundle,
}
