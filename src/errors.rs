// Error types and error handling module
// This file defines handler outcome kinds, their fixed HTTP mapping, and
// the status classification used by the error counters

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Terminal handler outcomes. Every failing request resolves to exactly one
/// of these; none of them ever reaches the transport layer uncaught.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("internal error: {0}")]
    Internal(String),
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::Forbidden => StatusCode::FORBIDDEN,
            HandlerError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            HandlerError::Internal(_) => "Internal Server Error",
            HandlerError::Forbidden => "403 Forbidden",
            HandlerError::NotFound => "404 Not Found",
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        // The reason stays in the logs; response bodies are fixed strings.
        if let HandlerError::Internal(reason) = &self {
            tracing::error!(reason = %reason, "request failed");
        }
        (self.status(), self.body()).into_response()
    }
}

/// Map a response status to the error-counter label it is tracked under.
/// Only the three classified statuses produce an error series.
pub fn error_label(status: StatusCode) -> Option<&'static str> {
    match status.as_u16() {
        500 => Some("500"),
        404 => Some("404"),
        403 => Some("403"),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider error: {0}")]
    Provider(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_status_and_body_mapping() {
        let internal = HandlerError::Internal("boom".to_string());
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.body(), "Internal Server Error");
        assert_eq!(HandlerError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(HandlerError::NotFound.body(), "404 Not Found");
        assert_eq!(HandlerError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(HandlerError::Forbidden.body(), "403 Forbidden");
    }

    #[test]
    fn only_tracked_statuses_produce_error_labels() {
        assert_eq!(error_label(StatusCode::INTERNAL_SERVER_ERROR), Some("500"));
        assert_eq!(error_label(StatusCode::NOT_FOUND), Some("404"));
        assert_eq!(error_label(StatusCode::FORBIDDEN), Some("403"));
        assert_eq!(error_label(StatusCode::OK), None);
        assert_eq!(error_label(StatusCode::METHOD_NOT_ALLOWED), None);
    }
}
