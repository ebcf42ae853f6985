//! JSON bodies shaped like weatherapi.com responses.

use serde_json::{Value, json};

pub fn condition(text: &str, code: i64) -> Value {
    json!({
        "text": text,
        "icon": format!("//cdn.weatherapi.com/weather/64x64/day/{code}.png"),
        "code": code
    })
}

pub fn current_body() -> Value {
    json!({
        "location": {
            "name": "Moscow",
            "region": "Moscow City",
            "country": "Russia",
            "lat": 55.75,
            "lon": 37.62,
            "tz_id": "Europe/Moscow",
            "localtime_epoch": 1747051440,
            "localtime": "2025-05-12 15:04"
        },
        "current": {
            "last_updated": "2025-05-12 15:00",
            "temp_c": 17.3,
            "temp_f": 63.1,
            "is_day": 1,
            "condition": condition("Partly cloudy", 1003),
            "wind_kph": 11.2,
            "humidity": 48,
            "feelslike_c": 16.9
        }
    })
}

fn day(date: &str, base_temp: f64) -> Value {
    let hours: Vec<Value> = (0..24u32)
        .map(|h| {
            json!({
                "time": format!("{date} {h:02}:00"),
                "temp_c": base_temp + f64::from(h) / 2.0,
                "condition": condition("Clear", 1000)
            })
        })
        .collect();

    json!({
        "date": date,
        "day": {
            "maxtemp_c": base_temp + 11.5,
            "mintemp_c": base_temp,
            "avgtemp_c": base_temp + 5.0,
            "condition": condition("Sunny", 1000)
        },
        "hour": hours
    })
}

pub fn forecast_body(days: usize) -> Value {
    let mut body = current_body();
    body["current"]["temp_c"] = json!(-40.0);
    body["forecast"] = json!({
        "forecastday": (0..days)
            .map(|i| day(&format!("2025-05-{:02}", 12 + i), 5.0 + i as f64))
            .collect::<Vec<_>>()
    });
    body
}
