use thiserror::Error;

/// Which of the two weather requests an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current",
            Endpoint::Forecast => "forecast",
        }
    }

    pub(crate) fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "current.json",
            Endpoint::Forecast => "forecast.json",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a weather fetch. Any of these fails the whole fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to reach WeatherAPI ({endpoint}): {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("WeatherAPI {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("WeatherAPI {0} response had an empty body")]
    NoData(Endpoint),

    #[error("Failed to parse WeatherAPI {endpoint} JSON: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

/// Why the device position could not be obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Location permission was revoked")]
    PermissionRevoked,

    #[error("Timed out waiting for a location fix")]
    Timeout,
}
