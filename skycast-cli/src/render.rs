//! Human-friendly output formatting for the dashboard view-model.

use chrono::{Local, TimeZone};
use skycast_core::{CurrentConditions, DailyPoint, ForecastBundle, HourlyPoint, WeatherView};

/// Hourly rows shown in the "today" panel.
const HOURLY_ROWS: usize = 6;

pub fn dashboard(view: &WeatherView) {
    current(&view.current, &view.forecast);
    hourly(&view.forecast.hourly);
    daily(&view.forecast.daily);
}

fn current(current: &CurrentConditions, forecast: &ForecastBundle) {
    println!();
    println!(
        "  {} {}, {}",
        condition_glyph(&current.condition_main),
        current.location_name,
        current.country_code
    );
    println!("  Current weather as of {}", forecast.display_time);
    println!();
    println!(
        "  {:.0}°C  {} ({})",
        current.temperature_c, current.condition_main, current.condition_description
    );
    println!(
        "  Feels like {:.0}°C, high {:.0}°C, low {:.0}°C",
        current.feels_like_c, current.max_c, current.min_c
    );
    println!();
    println!(
        "  Wind       {:.1} m/s ({:.0} km/h)",
        current.wind_speed_mps,
        current.wind_speed_mps * 3.6
    );
    println!("  Humidity   {}%", current.humidity_pct);
    println!("  Pressure   {:.0} hPa", current.pressure_hpa);
    println!(
        "  Visibility {:.1} km",
        f64::from(current.visibility_m) / 1000.0
    );
    println!(
        "  Sunrise    {}    Sunset    {}",
        clock(current.sunrise_epoch),
        clock(current.sunset_epoch)
    );
}

fn hourly(points: &[HourlyPoint]) {
    if points.is_empty() {
        return;
    }

    println!();
    println!("  Today");
    for point in points.iter().take(HOURLY_ROWS) {
        println!(
            "  {:>9}  {} {:>5.1}°C  rain {:>3.0}%  humidity {:>3}%  wind {:.1} m/s",
            point.time_label,
            condition_glyph(&point.condition_main),
            point.temperature_c,
            point.precipitation_chance * 100.0,
            point.humidity_pct,
            point.wind_speed_mps
        );
    }
}

fn daily(points: &[DailyPoint]) {
    if points.is_empty() {
        return;
    }

    println!();
    println!("  Next days");
    for point in points {
        println!(
            "  {:<9} {:>6}  {} {:>5.1}°C  humidity {:>3}%  wind {:.1} m/s",
            weekday(point.epoch),
            short_date(point.epoch),
            condition_glyph(&point.condition_main),
            point.temp_day_c,
            point.humidity_pct,
            point.wind_speed_mps
        );
    }
    println!();
}

/// Display glyph for an OpenWeather condition group.
fn condition_glyph(condition_main: &str) -> &'static str {
    match condition_main {
        "Clear" => "☀️",
        "Clouds" => "⛅",
        "Rain" => "🌧️",
        "Drizzle" => "🌦️",
        "Thunderstorm" => "⛈️",
        "Snow" => "❄️",
        "Mist" | "Fog" | "Haze" => "🌫️",
        _ => "🌤️",
    }
}

fn clock(epoch: i64) -> String {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt| dt.format("%I:%M %p").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn weekday(epoch: i64) -> String {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt| dt.format("%A").to_string())
        .unwrap_or_default()
}

fn short_date(epoch: i64) -> String {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt| dt.format("%b %e").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_cover_the_condition_groups() {
        assert_eq!(condition_glyph("Clear"), "☀️");
        assert_eq!(condition_glyph("Fog"), condition_glyph("Mist"));
        // Unmapped groups get the fallback, not a panic.
        assert_eq!(condition_glyph("Ash"), "🌤️");
    }
}
