//! Location -> fetch -> hourly window, as driven by the display layer.

use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::{
    error::FetchError,
    hourly::hourly_window,
    location::LocationProvider,
    model::{Coordinate, HourSample, WeatherSnapshot},
    provider::WeatherSource,
};

/// Everything the display layer needs for one successful refresh.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub coordinate: Coordinate,
    pub snapshot: WeatherSnapshot,
    pub hourly: Vec<HourSample>,
}

#[derive(Debug)]
pub enum Refresh {
    Ready(Box<Loaded>),
    Failed(FetchError),
    /// Another refresh was still outstanding; nothing was done.
    AlreadyRunning,
}

#[derive(Debug)]
pub struct WeatherScreen {
    location: LocationProvider,
    source: Box<dyn WeatherSource>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the refresh ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl WeatherScreen {
    pub fn new(location: LocationProvider, source: Box<dyn WeatherSource>) -> Self {
        Self { location, source, in_flight: AtomicBool::new(false) }
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run the whole pipeline once. A retry is simply another call.
    pub async fn refresh(&self, now: NaiveDateTime) -> Refresh {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("refresh requested while another is in flight; ignoring");
            return Refresh::AlreadyRunning;
        }
        let _guard = InFlight(&self.in_flight);

        let coordinate = self.location.resolve().await;

        match self.source.fetch(coordinate).await {
            Ok(snapshot) => {
                let hourly = hourly_window(snapshot.forecast.as_ref(), now);
                info!(hours = hourly.len(), "weather screen ready");
                Refresh::Ready(Box::new(Loaded { coordinate, snapshot, hourly }))
            }
            Err(e) => {
                warn!(error = %e, "weather fetch failed");
                Refresh::Failed(e)
            }
        }
    }
}
