use chrono::{DateTime, TimeZone};

use crate::api::{CurrentPayload, ForecastPayload, ForecastSlot};
use crate::model::{CurrentConditions, DailyPoint, ForecastBundle, HourlyPoint, WeatherView};

/// First 24 slots of the 3-hour feed become the hourly series.
const HOURLY_WINDOW: usize = 24;

/// Every 8th slot (8 x 3h = 24h) stands in for one day.
const DAILY_STRIDE: usize = 8;

/// The daily series is capped at 7 entries.
const DAILY_CAP: usize = 7;

/// Shape the two raw payloads into the dashboard view-model.
///
/// Pure: the fetch moment comes in as `fetched_at`, so the same inputs always
/// produce the same view. Clock labels are rendered in `fetched_at`'s
/// timezone.
///
/// The daily series samples the feed at indices 0, 8, 16, ... and carries each
/// sample's instantaneous temperatures as the day/min/max values. That is the
/// shape the dashboard was built around; do not replace it with a true daily
/// aggregate.
pub fn build_view<Tz>(
    current: &CurrentPayload,
    forecast: &ForecastPayload,
    fetched_at: DateTime<Tz>,
) -> WeatherView
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let tz = fetched_at.timezone();

    let hourly = forecast
        .list
        .iter()
        .take(HOURLY_WINDOW)
        .map(|slot| hourly_point(slot, &tz))
        .collect();

    let daily = forecast
        .list
        .iter()
        .step_by(DAILY_STRIDE)
        .take(DAILY_CAP)
        .map(daily_point)
        .collect();

    let condition = current.weather.first();

    let view_current = CurrentConditions {
        location_name: current.name.clone(),
        country_code: current.sys.country.clone().unwrap_or_default(),
        temperature_c: current.main.temp,
        feels_like_c: current.main.feels_like,
        min_c: current.main.temp_min,
        max_c: current.main.temp_max,
        humidity_pct: current.main.humidity,
        wind_speed_mps: current.wind.speed,
        pressure_hpa: current.main.pressure,
        visibility_m: current.visibility.unwrap_or(0),
        sunrise_epoch: current.sys.sunrise,
        sunset_epoch: current.sys.sunset,
        condition_main: condition
            .map(|w| w.main.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        condition_description: condition
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        condition_icon: condition.map(|w| w.icon.clone()).unwrap_or_default(),
    };

    let forecast_bundle = ForecastBundle {
        hourly,
        daily,
        display_time: fetched_at.format("%I:%M %p").to_string(),
        sunrise_epoch: current.sys.sunrise,
        sunset_epoch: current.sys.sunset,
    };

    WeatherView {
        current: view_current,
        forecast: forecast_bundle,
    }
}

fn hourly_point<Tz>(slot: &ForecastSlot, tz: &Tz) -> HourlyPoint
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let time_label = tz
        .timestamp_opt(slot.dt, 0)
        .single()
        .map(|dt| dt.format("%I:%M %p").to_string())
        .unwrap_or_default();

    let condition = slot.weather.first();

    HourlyPoint {
        epoch: slot.dt,
        time_label,
        temperature_c: slot.main.temp,
        condition_main: condition
            .map(|w| w.main.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        precipitation_chance: slot.pop.unwrap_or(0.0),
        // The 3-hour feed has no UV field.
        uv_index: 0.0,
        humidity_pct: slot.main.humidity,
        wind_speed_mps: slot.wind.speed,
    }
}

fn daily_point(slot: &ForecastSlot) -> DailyPoint {
    let condition = slot.weather.first();

    DailyPoint {
        epoch: slot.dt,
        temp_day_c: slot.main.temp,
        temp_min_c: slot.main.temp_min,
        temp_max_c: slot.main.temp_max,
        condition_main: condition
            .map(|w| w.main.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        condition_description: condition
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        condition_icon: condition.map(|w| w.icon.clone()).unwrap_or_default(),
        humidity_pct: slot.main.humidity,
        wind_speed_mps: slot.wind.speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use serde_json::json;

    fn current_fixture() -> CurrentPayload {
        serde_json::from_value(json!({
            "name": "Paris",
            "dt": 1_700_000_000,
            "main": {
                "temp": 14.2,
                "feels_like": 13.1,
                "temp_min": 11.0,
                "temp_max": 16.5,
                "humidity": 62,
                "pressure": 1013.0
            },
            "weather": [{ "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
            "wind": { "speed": 4.1 },
            "sys": { "country": "FR", "sunrise": 1_699_970_000, "sunset": 1_700_005_000 },
            "visibility": 10_000
        }))
        .expect("valid current fixture")
    }

    fn forecast_fixture(slots: usize) -> ForecastPayload {
        let list: Vec<_> = (0..slots)
            .map(|i| {
                json!({
                    "dt": 1_700_000_000 + (i as i64) * 10_800,
                    "main": {
                        "temp": 10.0 + i as f64,
                        "feels_like": 9.0 + i as f64,
                        "temp_min": 8.0 + i as f64,
                        "temp_max": 12.0 + i as f64,
                        "humidity": 50,
                        "pressure": 1010.0
                    },
                    "weather": [{ "main": "Rain", "description": "light rain", "icon": "10d" }],
                    "wind": { "speed": 3.0 },
                    "pop": 0.4
                })
            })
            .collect();

        serde_json::from_value(json!({ "list": list })).expect("valid forecast fixture")
    }

    fn fetch_moment() -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("valid offset")
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn hourly_takes_the_first_24_slots_in_feed_order() {
        let view = build_view(&current_fixture(), &forecast_fixture(40), fetch_moment());

        assert_eq!(view.forecast.hourly.len(), 24);
        for (i, point) in view.forecast.hourly.iter().enumerate() {
            assert_eq!(point.temperature_c, 10.0 + i as f64);
        }
    }

    #[test]
    fn short_feeds_yield_short_hourly_series() {
        let view = build_view(&current_fixture(), &forecast_fixture(9), fetch_moment());
        assert_eq!(view.forecast.hourly.len(), 9);
    }

    #[test]
    fn daily_samples_every_8th_slot_capped_at_7() {
        // 40 slots: indices 0, 8, 16, 24, 32.
        let view = build_view(&current_fixture(), &forecast_fixture(40), fetch_moment());

        assert_eq!(view.forecast.daily.len(), 5);
        for (i, day) in view.forecast.daily.iter().enumerate() {
            assert_eq!(day.temp_day_c, 10.0 + (i * 8) as f64);
            assert_eq!(day.temp_min_c, 8.0 + (i * 8) as f64);
            assert_eq!(day.temp_max_c, 12.0 + (i * 8) as f64);
        }

        // A 5-day feed is 40 slots; anything longer still caps at 7.
        let view = build_view(&current_fixture(), &forecast_fixture(80), fetch_moment());
        assert_eq!(view.forecast.daily.len(), 7);
    }

    #[test]
    fn missing_pop_defaults_to_zero_and_uv_is_always_zero() {
        let mut forecast = forecast_fixture(3);
        for slot in &mut forecast.list {
            slot.pop = None;
        }

        let view = build_view(&current_fixture(), &forecast, fetch_moment());

        for point in &view.forecast.hourly {
            assert_eq!(point.precipitation_chance, 0.0);
            assert_eq!(point.uv_index, 0.0);
        }
    }

    #[test]
    fn current_conditions_map_field_for_field() {
        let view = build_view(&current_fixture(), &forecast_fixture(8), fetch_moment());
        let current = &view.current;

        assert_eq!(current.location_name, "Paris");
        assert_eq!(current.country_code, "FR");
        assert_eq!(current.temperature_c, 14.2);
        assert_eq!(current.feels_like_c, 13.1);
        assert_eq!(current.humidity_pct, 62);
        assert_eq!(current.visibility_m, 10_000);
        assert_eq!(current.condition_main, "Clouds");
        assert_eq!(current.condition_description, "broken clouds");
        assert_eq!(current.condition_icon, "04d");
        assert_eq!(current.sunrise_epoch, 1_699_970_000);
        assert_eq!(current.sunset_epoch, 1_700_005_000);
    }

    #[test]
    fn sunrise_sunset_and_display_time_land_in_the_bundle() {
        let view = build_view(&current_fixture(), &forecast_fixture(8), fetch_moment());

        assert_eq!(view.forecast.sunrise_epoch, 1_699_970_000);
        assert_eq!(view.forecast.sunset_epoch, 1_700_005_000);
        // 1_700_000_000 is 22:13:20 UTC.
        assert_eq!(view.forecast.display_time, "10:13 PM");
    }

    #[test]
    fn transforming_twice_yields_identical_views() {
        let current = current_fixture();
        let forecast = forecast_fixture(40);
        let at = fetch_moment();

        let first = build_view(&current, &forecast, at);
        let second = build_view(&current, &forecast, at);

        assert_eq!(first, second);
    }

    #[test]
    fn empty_condition_arrays_fall_back_to_unknown() {
        let mut current = current_fixture();
        current.weather.clear();

        let view = build_view(&current, &forecast_fixture(1), fetch_moment());

        assert_eq!(view.current.condition_main, "Unknown");
        assert_eq!(view.current.condition_icon, "");
    }
}
