// Configuration management module
// This file handles loading and parsing of configuration settings
// from environment variables

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Shared key intended to gate metrics scraping (PROMETHEUS_HEX).
    /// Loaded and reported at startup; not checked on the scrape route.
    pub prometheus_hex: Option<String>,
    /// Listen port; the service binds all interfaces.
    pub port: u16,
    /// Geolocation API base, e.g. http://ip-api.com/json/
    pub geo_endpoint: Url,
    /// Budget for a single geolocation lookup, in milliseconds.
    pub geo_timeout_ms: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cfg = config::Config::builder()
            .set_default("port", 5001_i64)?
            .set_default("geo_endpoint", "http://ip-api.com/json/")?
            .set_default("geo_timeout_ms", 3000_i64)?
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn geo_timeout(&self) -> Duration {
        Duration::from_millis(self.geo_timeout_ms)
    }
}
