//! Locating the user.
//!
//! A terminal has no position API of its own, so the position comes from a
//! [`Locator`]: an IP geolocation lookup, coordinates from the config, or
//! nothing at all when the user turned location off.

use std::fmt::Debug;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::weather::Coordinates;

pub const DEFAULT_IP_ENDPOINT: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("User denied geolocation")]
    PermissionDenied,
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),
    #[error("Timeout expired while locating")]
    Timeout,
}

/// Single-shot position lookup. Blocks the calling thread.
pub trait Locator: Send + Sync + Debug {
    fn acquire(&self) -> Result<Coordinates, LocationError>;
}

/// Location turned off by the user.
#[derive(Debug, Default)]
pub struct DeniedLocator;

impl Locator for DeniedLocator {
    fn acquire(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

#[derive(Debug)]
pub struct FixedLocator(pub Coordinates);

impl Locator for FixedLocator {
    fn acquire(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

#[derive(Deserialize, Debug)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// ip-api.com style lookup of the machine's public address.
#[derive(Debug)]
pub struct IpLocator {
    http: Client,
    endpoint: String,
}

impl IpLocator {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(concat!("wxnow/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

impl Locator for IpLocator {
    fn acquire(&self) -> Result<Coordinates, LocationError> {
        info!(endpoint = %self.endpoint, "locating by IP address");
        let response: IpApiResponse = self
            .http
            .get(&self.endpoint)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| {
                warn!(error = %e, "geolocation lookup failed");
                if e.is_timeout() {
                    LocationError::Timeout
                } else {
                    LocationError::PositionUnavailable(e.to_string())
                }
            })?;

        match (response.status.as_str(), response.lat, response.lon) {
            ("success", Some(lat), Some(lon)) => {
                info!(lat, lon, "geolocation resolved");
                Ok(Coordinates::new(lat, lon))
            }
            _ => {
                let reason = response
                    .message
                    .unwrap_or_else(|| format!("lookup status {}", response.status));
                warn!(%reason, "geolocation refused");
                Err(LocationError::PositionUnavailable(reason))
            }
        }
    }
}
