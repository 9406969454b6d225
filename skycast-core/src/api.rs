use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::QueryError;
use crate::model::Location;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Uniform timeout for every outbound call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the OpenWeather geocoding, current-conditions and forecast
/// endpoints. All requests share the 10 second timeout and the metric unit
/// system.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self, QueryError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Client against a non-default host. Tests point this at a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, QueryError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| QueryError::Unknown(err.to_string()))?;

        Ok(Self {
            api_key,
            base_url,
            http,
        })
    }

    /// Forward geocoding: cleaned city name to coordinates, at most one match.
    ///
    /// Zero matches map to `NotFound` echoing the query.
    pub async fn geocode_city(&self, cleaned_city: &str) -> Result<Location, QueryError> {
        let url = format!("{}/geo/1.0/direct", self.base_url);
        let query = [
            ("q", cleaned_city.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];

        let entries: Vec<GeoEntry> = self.get_json(&url, &query, cleaned_city).await?;

        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| QueryError::NotFound(cleaned_city.to_string()))?;

        tracing::debug!(city = cleaned_city, lat = entry.lat, lon = entry.lon, "geocoded");

        Ok(Location {
            latitude: entry.lat,
            longitude: entry.lon,
            resolved_name: entry.name,
            country: entry.country,
        })
    }

    /// Reverse geocoding for the geolocation bootstrap: coordinates to the
    /// nearest place name.
    pub async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Location, QueryError> {
        let url = format!("{}/geo/1.0/reverse", self.base_url);
        let subject = format!("{latitude:.4},{longitude:.4}");
        let query = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];

        let entries: Vec<GeoEntry> = self.get_json(&url, &query, &subject).await?;

        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| QueryError::NotFound(subject))?;

        tracing::debug!(place = %entry.name, "reverse geocoded");

        Ok(Location {
            latitude: entry.lat,
            longitude: entry.lon,
            resolved_name: entry.name,
            country: entry.country,
        })
    }

    /// Fetch current conditions and the 3-hour forecast concurrently.
    ///
    /// Both must succeed. The join is fail-fast: the first error decides the
    /// outcome and the other in-flight request is dropped.
    pub async fn fetch_weather(
        &self,
        location: &Location,
    ) -> Result<(CurrentPayload, ForecastPayload), QueryError> {
        tokio::try_join!(self.fetch_current(location), self.fetch_forecast(location))
    }

    async fn fetch_current(&self, location: &Location) -> Result<CurrentPayload, QueryError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        self.get_json(&url, &self.coord_query(location), &location.resolved_name)
            .await
    }

    async fn fetch_forecast(&self, location: &Location) -> Result<ForecastPayload, QueryError> {
        let url = format!("{}/data/2.5/forecast", self.base_url);
        self.get_json(&url, &self.coord_query(location), &location.resolved_name)
            .await
    }

    fn coord_query(&self, location: &Location) -> [(&'static str, String); 4] {
        [
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ]
    }

    /// Shared request path: send, map the status, then decode the body.
    ///
    /// `subject` names what is being looked up; it only surfaces in `NotFound`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        subject: &str,
    ) -> Result<T, QueryError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        let body = res.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, &body, subject));
        }

        if body.trim().is_empty() {
            return Err(QueryError::UpstreamMalformed(
                "empty response body".to_string(),
            ));
        }

        serde_json::from_str(&body).map_err(|err| {
            QueryError::UpstreamMalformed(format!("{err}: {}", truncate_body(&body)))
        })
    }
}

/// Raw payload shapes, kept 1:1 with the OpenWeather JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub pressure: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCondition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiWind {
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSys {
    pub country: Option<String>,
    pub sunrise: i64,
    pub sunset: i64,
}

/// `/data/2.5/weather` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentPayload {
    pub name: String,
    pub dt: i64,
    pub main: ApiMain,
    pub weather: Vec<ApiCondition>,
    pub wind: ApiWind,
    pub sys: ApiSys,
    pub visibility: Option<u32>,
}

/// One 3-hour slot of `/data/2.5/forecast`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSlot {
    pub dt: i64,
    pub main: ApiMain,
    pub weather: Vec<ApiCondition>,
    pub wind: ApiWind,
    pub pop: Option<f64>,
}

/// `/data/2.5/forecast` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<ForecastSlot>,
}

/// Error body the service returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

fn transport_error(err: reqwest::Error) -> QueryError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        QueryError::NetworkUnreachable
    } else {
        QueryError::Unknown(err.to_string())
    }
}

fn status_error(status: StatusCode, body: &str, subject: &str) -> QueryError {
    match status {
        StatusCode::UNAUTHORIZED => QueryError::Unauthorized,
        StatusCode::NOT_FOUND => QueryError::NotFound(subject.to_string()),
        StatusCode::TOO_MANY_REQUESTS => QueryError::RateLimited,
        _ => QueryError::Unknown(upstream_message(status, body)),
    }
}

fn upstream_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| truncate_body(body));

    format!("status {}: {}", status.as_u16(), detail)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_ignores_the_body() {
        let unauthorized = status_error(StatusCode::UNAUTHORIZED, "{\"cod\":401}", "Paris");
        assert!(matches!(unauthorized, QueryError::Unauthorized));

        let rate_limited = status_error(StatusCode::TOO_MANY_REQUESTS, "slow down", "Paris");
        assert!(matches!(rate_limited, QueryError::RateLimited));

        let not_found = status_error(StatusCode::NOT_FOUND, "", "Paris");
        assert!(matches!(not_found, QueryError::NotFound(city) if city == "Paris"));
    }

    #[test]
    fn other_statuses_carry_the_upstream_message() {
        let err = status_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "{\"cod\":500,\"message\":\"upstream exploded\"}",
            "Paris",
        );

        match err {
            QueryError::Unknown(detail) => {
                assert!(detail.contains("500"));
                assert!(detail.contains("upstream exploded"));
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_error_bodies_fall_back_to_the_raw_text() {
        let err = status_error(StatusCode::BAD_GATEWAY, "<html>oops</html>", "Paris");

        match err {
            QueryError::Unknown(detail) => assert!(detail.contains("<html>oops</html>")),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let truncated = truncate_body(&body);
        assert!(truncated.len() < body.len());
        assert!(truncated.ends_with("..."));
    }
}
