//! Core library for the `nowcast` weather screen.
//!
//! This crate defines:
//! - Location resolution with a fixed fallback coordinate
//! - The weatherapi.com fetcher that joins the current and forecast calls
//! - The rolling 24-hour window derived from a forecast
//! - The screen pipeline tying those together, and configuration
//!
//! It is used by `nowcast-cli`, but any other display layer can drive
//! [`WeatherScreen`] the same way.

pub mod config;
pub mod error;
pub mod hourly;
pub mod location;
pub mod model;
pub mod provider;
pub mod screen;

pub use config::{Config, LocationConfig};
pub use error::{Endpoint, FetchError, LocationError};
pub use hourly::hourly_window;
pub use location::{
    FixedPosition, IpGeolocation, LocationProvider, LocationService, Permission, ResolveState,
};
pub use model::{
    Condition, Coordinate, CurrentWeather, DaySummary, Forecast, ForecastDay, HourSample, Place,
    WeatherSnapshot,
};
pub use provider::{WeatherSource, source_from_config, weatherapi::WeatherApiFetcher};
pub use screen::{Loaded, Refresh, WeatherScreen};
