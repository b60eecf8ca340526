// Router HTTP API implementation
// This file provides the demo page handlers, the metrics exposition
// endpoint, and the router wiring that wraps them in lifecycle hooks

use axum::{
    extract::State,
    http::header,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router as AxumRouter,
};
use tower_http::trace::TraceLayer;

use crate::errors::HandlerError;
use crate::router::hooks;
use crate::state::AppState;

/// Create the HTTP router: demo pages, the exposition endpoint, and a 404
/// fallback, all wrapped by the lifecycle middleware so every request —
/// known route or not — passes through exactly one pre/post hook pair.
pub fn create_app_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/signup", get(signup))
        .route("/error", get(trigger_error))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            hooks::track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> &'static str {
    "Welcome to the Home Page!"
}

async fn about() -> &'static str {
    "Welcome to the about page!"
}

async fn contact() -> &'static str {
    "Welcome to the contact page!"
}

/// Signup stub: bumps the business counter, then answers like any other page.
async fn signup(State(state): State<AppState>) -> &'static str {
    state.telemetry.user_signups.inc();
    "User signed up!"
}

/// Always fails, exercising the 500 branch of the error classifier.
async fn trigger_error() -> Result<Response, HandlerError> {
    Err(HandlerError::Internal("oops got an error".to_string()))
}

/// Exposition endpoint. Renders the registry snapshot as plain text; a
/// render failure surfaces through the generic 500 branch.
async fn metrics(State(state): State<AppState>) -> Result<Response, HandlerError> {
    let body = state
        .telemetry
        .render()
        .map_err(|e| HandlerError::Internal(format!("render metrics: {e}")))?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response())
}

async fn not_found() -> HandlerError {
    HandlerError::NotFound
}
