//! Text rendering of the weather screen.

use nowcast_core::{ForecastDay, HourSample, Loaded, Place, WeatherSnapshot};

pub const LOADING: &str = "Loading weather data...";
pub const FAILED: &str = "Failed to load weather data";

/// Whole degrees, truncated toward zero.
pub fn degrees(celsius: f64) -> String {
    format!("{}°", celsius.trunc() as i64)
}

fn place_name(place: &Place) -> String {
    match place.country.as_deref() {
        Some(country) if !country.is_empty() => format!("{}, {}", place.name, country),
        _ => place.name.clone(),
    }
}

pub fn current_panel(snapshot: &WeatherSnapshot) -> String {
    let current = &snapshot.current;

    lines(vec![
        place_name(&snapshot.location),
        degrees(current.temperature_c),
        current.condition.text.clone(),
        format!("Feels like {}", degrees(current.feels_like_c)),
        format!("Wind: {:.1} km/h", current.wind_kph),
        format!("Humidity: {}%", current.humidity_pct),
    ])
}

/// Newline-terminated lines.
fn lines(rows: Vec<String>) -> String {
    rows.into_iter().map(|row| row + "\n").collect()
}

pub fn hour_row(hour: &HourSample) -> String {
    format!(
        "  {:>2}  {:>5}  {}",
        hour.hour_label(),
        degrees(hour.temperature_c),
        hour.condition.icon_url()
    )
}

pub fn day_row(day: &ForecastDay) -> String {
    format!(
        "  {:<10} {:>5} {:>5}  {}",
        day.weekday().unwrap_or(day.date.as_str()),
        degrees(day.summary.max_temp_c),
        degrees(day.summary.min_temp_c),
        day.summary.condition.icon_url()
    )
}

pub fn screen(loaded: &Loaded) -> String {
    let mut out = current_panel(&loaded.snapshot);

    if let Some(forecast) = &loaded.snapshot.forecast {
        let mut rows = vec![String::new(), "Next 24 hours".to_string()];
        rows.extend(loaded.hourly.iter().map(hour_row));
        rows.push(String::new());
        rows.push(format!("{}-day forecast", forecast.days.len()));
        rows.extend(forecast.days.iter().map(day_row));

        out.push_str(&lines(rows));
    }

    out
}
