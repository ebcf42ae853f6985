use crate::{
    Config, FetchError,
    model::{Coordinate, WeatherSnapshot},
    provider::weatherapi::WeatherApiFetcher,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

/// Anything that can produce a merged weather snapshot for a coordinate.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the weatherapi.com fetcher from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherSource>> {
    let api_key = config.require_api_key()?;
    let forecast_days = config.checked_forecast_days()?;

    let fetcher = WeatherApiFetcher::builder(api_key.to_owned())
        .base_url(config.base_url.clone())
        .forecast_days(forecast_days)
        .timeout(config.request_timeout())
        .build()?;

    Ok(Box::new(fetcher))
}
