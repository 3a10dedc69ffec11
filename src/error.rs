use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Rejections raised by the trip controller. None of these are fatal; the
/// meter keeps running and the caller decides how to report them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TripError {
    #[error("no known position yet; wait for a gps fix")]
    NoPosition,

    #[error("a trip is already in progress")]
    TripInProgress,

    #[error("no trip in progress")]
    NoActiveTrip,

    #[error("trip is not running")]
    NotRunning,

    #[error("trip is not paused")]
    NotPaused,

    #[error("unknown route: {0}")]
    UnknownRoute(String),

    #[error("unknown sub-route {sub_route} for route {route}")]
    UnknownSubRoute { route: String, sub_route: String },

    #[error("unknown special zone: {0}")]
    UnknownZone(String),

    #[error("special zone is not active")]
    ZoneInactive,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("meter unavailable")]
    MeterUnavailable,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TripError> for AppError {
    fn from(err: TripError) -> Self {
        match err {
            TripError::UnknownRoute(_)
            | TripError::UnknownSubRoute { .. }
            | TripError::UnknownZone(_) => AppError::BadRequest(err.to_string()),
            _ => AppError::Conflict(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::MeterUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "meter unavailable".to_string(),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
