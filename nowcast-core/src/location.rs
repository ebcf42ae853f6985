//! Best-effort device position with a fixed fallback.
//!
//! [`LocationProvider::resolve`] always completes with exactly one
//! coordinate: the first fix obtained from the [`LocationService`], or the
//! configured fallback when permission is refused, the service fails, or no
//! fix arrives before the timeout.

use anyhow::Context;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use tracing::{debug, info, warn};

use crate::{error::LocationError, model::Coordinate};

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Undetermined,
    Granted,
    Denied,
    Restricted,
}

impl Permission {
    pub fn from_setting(allowed: Option<bool>) -> Self {
        match allowed {
            Some(true) => Permission::Granted,
            Some(false) => Permission::Denied,
            None => Permission::Undetermined,
        }
    }
}

/// Device location boundary.
#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    fn permission(&self) -> Permission;

    /// Ask for permission; only called while the permission is undetermined.
    async fn request_permission(&self) -> Permission;

    /// One position fix.
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Idle,
    AwaitingPermission,
    AwaitingFix,
    Completed,
}

#[derive(Debug)]
pub struct LocationProvider {
    service: Box<dyn LocationService>,
    fallback: Coordinate,
    fix_timeout: Duration,
    permission_timeout: Duration,
    state: Mutex<ResolveState>,
    // one resolve at a time
    turn: tokio::sync::Mutex<()>,
}

impl LocationProvider {
    pub fn new(service: Box<dyn LocationService>) -> Self {
        Self {
            service,
            fallback: Coordinate::DEFAULT,
            fix_timeout: Duration::from_secs(10),
            permission_timeout: Duration::from_secs(60),
            state: Mutex::new(ResolveState::Idle),
            turn: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_fallback(mut self, fallback: Coordinate) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_fix_timeout(mut self, timeout: Duration) -> Self {
        self.fix_timeout = timeout;
        self
    }

    /// Bound on the permission request; an unanswered request counts as refused.
    pub fn with_permission_timeout(mut self, timeout: Duration) -> Self {
        self.permission_timeout = timeout;
        self
    }

    pub fn fallback(&self) -> Coordinate {
        self.fallback
    }

    pub fn state(&self) -> ResolveState {
        *self.state.lock()
    }

    fn enter(&self, next: ResolveState) {
        *self.state.lock() = next;
    }

    /// Resolve a coordinate for the weather lookup.
    pub async fn resolve(&self) -> Coordinate {
        let _turn = self.turn.lock().await;
        self.enter(ResolveState::Idle);

        let coordinate = match self.obtain().await {
            Ok(coordinate) => {
                info!(%coordinate, "location resolved");
                coordinate
            }
            Err(reason) => {
                warn!(%reason, fallback = %self.fallback, "using fallback location");
                self.fallback
            }
        };

        self.enter(ResolveState::Completed);
        coordinate
    }

    async fn obtain(&self) -> Result<Coordinate, String> {
        let mut permission = self.service.permission();

        if permission == Permission::Undetermined {
            self.enter(ResolveState::AwaitingPermission);
            debug!("requesting location permission");
            permission =
                tokio::time::timeout(self.permission_timeout, self.service.request_permission())
                    .await
                    .map_err(|_| "no answer to the location permission request".to_string())?;
        }

        match permission {
            Permission::Granted => {}
            Permission::Denied | Permission::Restricted | Permission::Undetermined => {
                return Err(format!("location permission {permission:?}"));
            }
        }

        self.enter(ResolveState::AwaitingFix);
        let fix = tokio::time::timeout(self.fix_timeout, self.service.current_position())
            .await
            .unwrap_or(Err(LocationError::Timeout));

        match fix {
            Ok(coordinate) if coordinate.is_finite() => Ok(coordinate),
            Ok(coordinate) => Err(format!("service returned invalid coordinate {coordinate:?}")),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// A position known up front, e.g. from the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinate);

#[async_trait]
impl LocationService for FixedPosition {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    http: Client,
    url: String,
    permission: Permission,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

impl IpGeolocation {
    pub fn new(http: Client, permission: Permission) -> Self {
        Self { http, url: DEFAULT_IP_LOOKUP_URL.to_string(), permission }
    }

    /// Lookup with its own HTTP client bounded by `timeout`.
    pub fn with_timeout(permission: Permission, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for IP lookup")?;

        Ok(Self::new(http, permission))
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl LocationService for IpGeolocation {
    fn permission(&self) -> Permission {
        self.permission
    }

    async fn request_permission(&self) -> Permission {
        // no one to ask; undetermined stays a refusal
        self.permission
    }

    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        debug!(url = %self.url, "looking up position by IP");

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        let parsed: IpApiResponse =
            res.json().await.map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if parsed.status != "success" {
            let message = parsed.message.unwrap_or_else(|| parsed.status.clone());
            return Err(LocationError::Unavailable(message));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => {
                debug!(city = parsed.city.as_deref().unwrap_or("?"), "IP lookup succeeded");
                Ok(Coordinate::new(lat, lon))
            }
            _ => Err(LocationError::Unavailable("response had no coordinates".into())),
        }
    }
}
