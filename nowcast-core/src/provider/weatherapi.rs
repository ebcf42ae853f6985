use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    config::{DEFAULT_BASE_URL, DEFAULT_FORECAST_DAYS},
    error::{Endpoint, FetchError},
    model::{
        Condition, Coordinate, CurrentWeather, DaySummary, Forecast, ForecastDay, HourSample,
        Place, WeatherSnapshot,
    },
};

use super::WeatherSource;

/// weatherapi.com client: one `current.json` and one `forecast.json` call per fetch.
#[derive(Debug, Clone)]
pub struct WeatherApiFetcher {
    api_key: String,
    base_url: String,
    forecast_days: u8,
    http: Client,
}

#[derive(Debug)]
pub struct WeatherApiFetcherBuilder {
    api_key: String,
    base_url: String,
    forecast_days: u8,
    timeout: Duration,
}

impl WeatherApiFetcherBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn forecast_days(mut self, days: u8) -> Self {
        self.forecast_days = days;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> anyhow::Result<WeatherApiFetcher> {
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client for WeatherAPI")?;

        Ok(WeatherApiFetcher {
            api_key: self.api_key,
            base_url: self.base_url,
            forecast_days: self.forecast_days,
            http,
        })
    }
}

impl WeatherApiFetcher {
    pub fn builder(api_key: String) -> WeatherApiFetcherBuilder {
        WeatherApiFetcherBuilder {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            timeout: Duration::from_secs(10),
        }
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, FetchError> {
        let base = if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        };

        let base = Url::parse(&base)
            .map_err(|e| FetchError::InvalidRequest(format!("bad base URL '{}': {e}", self.base_url)))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(FetchError::InvalidRequest(format!(
                "base URL '{}' is not http(s)",
                self.base_url
            )));
        }

        base.join(endpoint.path())
            .map_err(|e| FetchError::InvalidRequest(format!("bad {endpoint} URL: {e}")))
    }

    fn current_request(&self, coordinate: Coordinate) -> Result<RequestBuilder, FetchError> {
        let url = self.endpoint_url(Endpoint::Current)?;

        Ok(self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("q", coordinate.query().as_str())]))
    }

    fn forecast_request(&self, coordinate: Coordinate) -> Result<RequestBuilder, FetchError> {
        let url = self.endpoint_url(Endpoint::Forecast)?;

        Ok(self.http.get(url).query(&[
            ("key", self.api_key.as_str()),
            ("q", coordinate.query().as_str()),
            ("days", self.forecast_days.to_string().as_str()),
        ]))
    }
}

/// Send one request and return its body bytes.
async fn fetch_body(endpoint: Endpoint, request: RequestBuilder) -> Result<Vec<u8>, FetchError> {
    let res = request
        .send()
        .await
        .map_err(|source| FetchError::Transport { endpoint, source })?;

    let status = res.status();
    let body = res
        .bytes()
        .await
        .map_err(|source| FetchError::Transport { endpoint, source })?;

    if !status.is_success() {
        return Err(FetchError::Status {
            endpoint,
            status,
            body: truncate_body(&String::from_utf8_lossy(&body)),
        });
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(FetchError::NoData(endpoint));
    }

    Ok(body.to_vec())
}

/// Decode both bodies and merge them into one snapshot.
fn decode_snapshot(current: &[u8], forecast: &[u8]) -> Result<WeatherSnapshot, FetchError> {
    let current: WaResponse = serde_json::from_slice(current)
        .map_err(|source| FetchError::Decode { endpoint: Endpoint::Current, source })?;
    let forecast: WaForecastResponse = serde_json::from_slice(forecast)
        .map_err(|source| FetchError::Decode { endpoint: Endpoint::Forecast, source })?;

    Ok(merge(current, forecast))
}

/// Location and current conditions come from the current response; only the
/// forecast days are taken from the forecast response.
fn merge(current: WaResponse, forecast: WaForecastResponse) -> WeatherSnapshot {
    WeatherSnapshot {
        location: current.location.into(),
        current: current.current.into(),
        forecast: forecast.forecast.map(|f| Forecast {
            days: f.forecastday.into_iter().map(ForecastDay::from).collect(),
        }),
    }
}

#[async_trait]
impl WeatherSource for WeatherApiFetcher {
    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, FetchError> {
        if !coordinate.is_finite() {
            return Err(FetchError::InvalidRequest(format!(
                "coordinate {coordinate:?} is not finite"
            )));
        }

        let current_req = self.current_request(coordinate)?;
        let forecast_req = self.forecast_request(coordinate)?;

        debug!(q = %coordinate.query(), days = self.forecast_days, "fetching current weather and forecast");

        let (current, forecast) = tokio::join!(
            fetch_body(Endpoint::Current, current_req),
            fetch_body(Endpoint::Forecast, forecast_req),
        );

        let snapshot = decode_snapshot(&current?, &forecast?)?;

        info!(
            location = %snapshot.location.name,
            days = snapshot.forecast.as_ref().map_or(0, |f| f.days.len()),
            "weather fetched"
        );

        Ok(snapshot)
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    region: Option<String>,
    country: Option<String>,
    lat: f64,
    lon: f64,
    localtime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
    code: i64,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    wind_kph: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    time: String,
    temp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
    hour: Vec<WaForecastHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: Option<WaForecast>,
}

impl From<WaCondition> for Condition {
    fn from(c: WaCondition) -> Self {
        Condition { text: c.text, icon: c.icon, code: c.code }
    }
}

impl From<WaLocation> for Place {
    fn from(l: WaLocation) -> Self {
        Place {
            name: l.name,
            latitude: l.lat,
            longitude: l.lon,
            region: l.region,
            country: l.country,
            localtime: l.localtime,
        }
    }
}

impl From<WaCurrent> for CurrentWeather {
    fn from(c: WaCurrent) -> Self {
        CurrentWeather {
            temperature_c: c.temp_c,
            condition: c.condition.into(),
            wind_kph: c.wind_kph,
            humidity_pct: c.humidity,
            feels_like_c: c.feelslike_c,
        }
    }
}

impl From<WaForecastDay> for ForecastDay {
    fn from(d: WaForecastDay) -> Self {
        ForecastDay {
            date: d.date,
            summary: DaySummary {
                max_temp_c: d.day.maxtemp_c,
                min_temp_c: d.day.mintemp_c,
                avg_temp_c: d.day.avgtemp_c,
                condition: d.day.condition.into(),
            },
            hours: d
                .hour
                .into_iter()
                .map(|h| HourSample {
                    time: h.time,
                    temperature_c: h.temp_c,
                    condition: h.condition.into(),
                })
                .collect(),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
