use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Used whenever the device position cannot be obtained.
    pub const DEFAULT: Coordinate = Coordinate { latitude: 55.7558, longitude: 37.6173 };

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Value of the `q` query parameter, e.g. `55.7558,37.6173`.
    pub fn query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Merged result of one fetch: current conditions plus the multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Place,
    pub current: CurrentWeather,
    pub forecast: Option<Forecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Option<String>,
    pub country: Option<String>,
    /// Local wall-clock time at the place, `YYYY-MM-DD HH:MM`.
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub humidity_pct: u8,
    pub feels_like_c: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Scheme-relative icon reference as returned by the API (`//cdn...`).
    pub icon: String,
    pub code: i64,
}

impl Condition {
    /// Fully-qualified icon URL, ready for an image loader.
    pub fn icon_url(&self) -> String {
        if self.icon.starts_with("//") {
            format!("https:{}", self.icon)
        } else {
            self.icon.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Forecast {
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub summary: DaySummary,
    /// One sample per hour of the day, chronological.
    pub hours: Vec<HourSample>,
}

impl ForecastDay {
    /// English weekday name of [`ForecastDay::date`], if it parses.
    pub fn weekday(&self) -> Option<&'static str> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()?;
        Some(weekday_name(date.weekday()))
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub avg_temp_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourSample {
    /// Local time of the sample, `YYYY-MM-DD HH:MM`.
    pub time: String,
    pub temperature_c: f64,
    pub condition: Condition,
}

impl HourSample {
    /// Hour of day (0-23) taken from the `HH` part of [`HourSample::time`].
    ///
    /// The time-of-day is the last space-separated token and the hour is
    /// everything before its first `:`. Anything else yields `None`.
    pub fn hour_of_day(&self) -> Option<u32> {
        let time_of_day = self.time.rsplit(' ').next()?;
        let hour = time_of_day.split(':').next()?.parse::<u32>().ok()?;
        (hour < 24).then_some(hour)
    }

    /// The `HH` label shown in the hourly strip.
    pub fn hour_label(&self) -> &str {
        let time_of_day = self.time.rsplit(' ').next().unwrap_or_default();
        time_of_day.split(':').next().unwrap_or_default()
    }
}
