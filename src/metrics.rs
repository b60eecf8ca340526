// Metrics and observability module
// This file owns the process-scoped registry and the fixed instrument set
// recorded by the request lifecycle hooks

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Process-wide instrument set. Constructed once at startup and shared by
/// reference into every hook and handler; instruments are never removed or
/// reset. Label combinations are created lazily on first observation and
/// live for the process lifetime.
pub struct Telemetry {
    registry: Registry,
    /// Clicks per endpoint path, including unknown (404) paths.
    pub endpoint_clicks: IntCounterVec,
    /// Handler latency per endpoint path, seconds.
    pub endpoint_latency: HistogramVec,
    /// Client coordinates observed per request; (0.0, 0.0) is the sentinel
    /// for a failed lookup.
    pub user_locations: IntCounterVec,
    /// Classified failures keyed by (endpoint path, status code).
    pub endpoint_errors: IntCounterVec,
    /// Request body bytes per endpoint path.
    pub request_size: HistogramVec,
    /// Response body bytes per endpoint path.
    pub response_size: HistogramVec,
    /// Requests currently in flight.
    pub active_requests: IntGauge,
    /// Reserved for a database layer that never shipped; registered so it
    /// still appears in the exposition output.
    pub db_query_time: Histogram,
    /// Business counter bumped by the signup page.
    pub user_signups: IntCounter,
}

impl Telemetry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let endpoint_clicks = IntCounterVec::new(
            Opts::new("endpoint_clicks", "Total clicks per endpoint"),
            &["endpoint"],
        )?;
        registry.register(Box::new(endpoint_clicks.clone()))?;

        let endpoint_latency = HistogramVec::new(
            HistogramOpts::new("endpoint_latency_seconds", "Endpoint response time"),
            &["endpoint"],
        )?;
        registry.register(Box::new(endpoint_latency.clone()))?;

        let user_locations = IntCounterVec::new(
            Opts::new("unique_user_locations", "Unique user locations"),
            &["latitude", "longitude"],
        )?;
        registry.register(Box::new(user_locations.clone()))?;

        let endpoint_errors = IntCounterVec::new(
            Opts::new(
                "endpoint_errors",
                "Total errors per endpoint and status code",
            ),
            &["endpoint", "status_code"],
        )?;
        registry.register(Box::new(endpoint_errors.clone()))?;

        let request_size = HistogramVec::new(
            HistogramOpts::new("request_size_bytes", "Request size in bytes"),
            &["endpoint"],
        )?;
        registry.register(Box::new(request_size.clone()))?;

        let response_size = HistogramVec::new(
            HistogramOpts::new("response_size_bytes", "Response size in bytes"),
            &["endpoint"],
        )?;
        registry.register(Box::new(response_size.clone()))?;

        let active_requests = IntGauge::new("active_requests", "Number of active requests")?;
        registry.register(Box::new(active_requests.clone()))?;

        let db_query_time = Histogram::with_opts(HistogramOpts::new(
            "db_query_time_seconds",
            "Database query time",
        ))?;
        registry.register(Box::new(db_query_time.clone()))?;

        let user_signups = IntCounter::new("user_signups", "Total user signups")?;
        registry.register(Box::new(user_signups.clone()))?;

        Ok(Self {
            registry,
            endpoint_clicks,
            endpoint_latency,
            user_locations,
            endpoint_errors,
            request_size,
            response_size,
            active_requests,
            db_query_time,
            user_signups,
        })
    }

    /// Snapshot the registry in the text exposition format. Pure read.
    pub fn render(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}
