//! Rolling 24-hour window shown in the hourly strip.

use chrono::{NaiveDateTime, Timelike};

use crate::model::{Forecast, HourSample};

/// Maximum number of samples in the window.
pub const WINDOW_LEN: usize = 24;

/// Remaining hours of today followed by tomorrow's hours, at most 24 samples.
///
/// Today's samples are kept when their hour of day is at or after the hour
/// of `now`; samples whose timestamp does not parse are dropped. Tomorrow
/// contributes from its first hour onwards until the window is full.
pub fn hourly_window(forecast: Option<&Forecast>, now: NaiveDateTime) -> Vec<HourSample> {
    let Some(forecast) = forecast else {
        return Vec::new();
    };

    let current_hour = now.hour();
    let mut days = forecast.days.iter();

    let today = days
        .next()
        .into_iter()
        .flat_map(|day| day.hours.iter())
        .filter(|h| h.hour_of_day().is_some_and(|hour| hour >= current_hour));
    let tomorrow = days.next().into_iter().flat_map(|day| day.hours.iter());

    today.chain(tomorrow).take(WINDOW_LEN).cloned().collect()
}
