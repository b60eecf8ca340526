// Request lifecycle hooks
// Pre/post instrumentation wrapped around every route: timing, payload
// sizing, click and location counters, error classification, and the
// active-request gauge

use std::net::{IpAddr, SocketAddr};
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::errors::{error_label, HandlerError};
use crate::geo::Location;
use crate::state::AppState;

/// Paths excluded from click/latency/size/location instrumentation so that
/// scraping never skews the measurements it reads. Exclusion does not bypass
/// the gauge or the error counters.
const EXCLUDED_PATHS: [&str; 2] = ["/metrics", "/favicon.ico"];

fn is_excluded(path: &str) -> bool {
    EXCLUDED_PATHS.contains(&path)
}

/// Per-request ephemeral state: created when the request enters the hook,
/// owned by that request alone, consumed when the outcome is recorded.
struct RequestContext {
    started: Instant,
    path: String,
    request_bytes: usize,
}

/// The single lifecycle middleware. Increments the active-request gauge on
/// entry and decrements it exactly once on exit, whichever branch the
/// request leaves through (success, 404, 403, or 500).
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let mut ctx = RequestContext {
        started: Instant::now(),
        path: req.uri().path().to_string(),
        request_bytes: 0,
    };
    state.telemetry.active_requests.inc();

    let excluded = is_excluded(&ctx.path);
    let response = if excluded {
        next.run(req).await
    } else {
        match buffer_request(req).await {
            Ok((req, len)) => {
                ctx.request_bytes = len;
                next.run(req).await
            }
            Err(err) => err.into_response(),
        }
    };
    // Latency is taken here so the geolocation call below never inflates it.
    let elapsed = ctx.started.elapsed().as_secs_f64();

    let (response, response_bytes) = if excluded {
        (response, 0)
    } else {
        measure_response(response).await
    };

    record(&state, ctx, elapsed, response_bytes, response.status(), peer).await;
    state.telemetry.active_requests.dec();
    response
}

/// Buffer the request body to learn its byte length, handing the handler an
/// equivalent request.
async fn buffer_request(req: Request) -> Result<(Request, usize), HandlerError> {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| HandlerError::Internal(format!("read request body: {e}")))?;
    let len = bytes.len();
    Ok((Request::from_parts(parts, Body::from(bytes)), len))
}

/// Buffer the response body to learn its byte length, rebuilding an
/// equivalent response.
async fn measure_response(response: Response) -> (Response, usize) {
    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let len = bytes.len();
            (Response::from_parts(parts, Body::from(bytes)), len)
        }
        Err(e) => {
            warn!(error = %e, "failed to read response body for sizing");
            let response =
                HandlerError::Internal(format!("read response body: {e}")).into_response();
            (response, 0)
        }
    }
}

/// Post-hook bookkeeping. Error statuses are counted for every path; the
/// generic click/latency/size/location series only for non-excluded ones.
async fn record(
    state: &AppState,
    ctx: RequestContext,
    elapsed: f64,
    response_bytes: usize,
    status: StatusCode,
    peer: Option<IpAddr>,
) {
    let telemetry = &state.telemetry;
    let endpoint = ctx.path.as_str();

    if let Some(code) = error_label(status) {
        telemetry
            .endpoint_errors
            .with_label_values(&[endpoint, code])
            .inc();
    }

    if is_excluded(endpoint) {
        return;
    }

    telemetry
        .endpoint_clicks
        .with_label_values(&[endpoint])
        .inc();
    telemetry
        .endpoint_latency
        .with_label_values(&[endpoint])
        .observe(elapsed);
    telemetry
        .request_size
        .with_label_values(&[endpoint])
        .observe(ctx.request_bytes as f64);
    telemetry
        .response_size
        .with_label_values(&[endpoint])
        .observe(response_bytes as f64);

    let location = match peer {
        Some(ip) => state.geo.resolve(&ip.to_string()).await,
        None => Location::UNKNOWN,
    };
    let latitude = format!("{:?}", location.latitude);
    let longitude = format!("{:?}", location.longitude);
    telemetry
        .user_locations
        .with_label_values(&[latitude.as_str(), longitude.as_str()])
        .inc();
}
