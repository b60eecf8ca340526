use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use webpulse::config::AppConfig;
use webpulse::geo::GeoLocator;
use webpulse::metrics::Telemetry;
use webpulse::router::create_app_router;
use webpulse::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().context("initialize tracing subscriber")?;

    if let Err(err) = run().await {
        tracing::error!(error = ?err, "fatal server error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config = AppConfig::load().context("load configuration from environment")?;

    if config.prometheus_hex.is_some() {
        info!("metrics shared key loaded");
    } else {
        warn!("PROMETHEUS_HEX not set; metrics scraping stays open");
    }

    let telemetry = Telemetry::new().context("register metric instruments")?;
    let geo = GeoLocator::new(config.geo_endpoint.clone(), config.geo_timeout())
        .context("initialize geolocation client")?;

    let port = config.port;
    let state = AppState::new(config, telemetry, geo);
    let telemetry = state.telemetry.clone();

    let app = create_app_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(address = %addr, "webpulse HTTP server starting");

    let _server_handle = tokio::spawn(async move {
        let service = app.into_make_service_with_connect_info::<SocketAddr>();
        if let Err(e) = axum::serve(listener, service).await {
            warn!(error = %e, "HTTP server error");
        }
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!(
                    active_requests = telemetry.active_requests.get(),
                    signups = telemetry.user_signups.get(),
                    "webpulse heartbeat"
                );
            }
            res = tokio::signal::ctrl_c() => {
                if let Err(err) = res {
                    warn!(error = %err, "ctrl_c listener error");
                }
                info!("Shutdown signal received, exiting");
                break;
            }
        }
    }
    Ok(())
}

fn init_tracing() -> Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
