// Geolocation lookup module
// This file wraps the external IP geolocation API; lookups degrade to a
// sentinel pair and never fail the owning request

use crate::errors::GeoError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Resolved client coordinates, or the sentinel when the lookup failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Fallback pair recorded whenever real coordinates are unavailable.
    pub const UNKNOWN: Location = Location {
        latitude: 0.0,
        longitude: 0.0,
    };
}

#[derive(Debug, Deserialize)]
struct GeoPayload {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct GeoLocator {
    http: Client,
    base: Url,
}

impl GeoLocator {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, GeoError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeoError::Transport(format!("build http client: {e}")))?;
        Ok(Self { http, base })
    }

    /// Look up coordinates for a client address. Infallible by contract:
    /// network errors, timeouts, non-success responses, and malformed
    /// payloads all collapse to the sentinel pair. Single attempt, no retry.
    pub async fn resolve(&self, ip: &str) -> Location {
        match self.lookup(ip).await {
            Ok(location) => location,
            Err(err) => {
                debug!(ip = %ip, error = %err, "geolocation lookup failed; using sentinel");
                Location::UNKNOWN
            }
        }
    }

    async fn lookup(&self, ip: &str) -> Result<Location, GeoError> {
        let url = self
            .base
            .join(ip)
            .map_err(|e| GeoError::Transport(format!("lookup url: {e}")))?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GeoError::Transport(format!("geolocation send: {e}")))?;
        if !resp.status().is_success() {
            return Err(GeoError::Provider(format!("http {}", resp.status())));
        }
        let payload: GeoPayload = resp
            .json()
            .await
            .map_err(|e| GeoError::Transport(format!("json parse: {e}")))?;
        coordinates(payload)
    }
}

fn coordinates(payload: GeoPayload) -> Result<Location, GeoError> {
    if payload.status != "success" {
        return Err(GeoError::Provider(format!("status {}", payload.status)));
    }
    match (payload.lat, payload.lon) {
        (Some(latitude), Some(longitude)) => Ok(Location {
            latitude,
            longitude,
        }),
        _ => Err(GeoError::Provider("payload missing coordinates".to_string())),
    }
}
