// Shared application state
//
// One process-scoped bundle of configuration, the metric registry, and the
// geolocation client, cloned into every hook and handler.

use crate::config::AppConfig;
use crate::geo::GeoLocator;
use crate::metrics::Telemetry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub telemetry: Arc<Telemetry>,
    pub geo: Arc<GeoLocator>,
}

impl AppState {
    pub fn new(config: AppConfig, telemetry: Telemetry, geo: GeoLocator) -> Self {
        Self {
            config: Arc::new(config),
            telemetry: Arc::new(telemetry),
            geo: Arc::new(geo),
        }
    }
}
