use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::engine::meter::PositionEvent;
use crate::engine::queue::enqueue_position;
use crate::error::AppError;
use crate::models::position::{GpsFailure, Position};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/positions", post(push_position))
        .route("/gps/status", post(report_gps_status))
}

#[derive(Deserialize)]
pub struct PositionRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct GpsStatusRequest {
    pub status: GpsFailure,
}

async fn push_position(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PositionRequest>,
) -> Result<StatusCode, AppError> {
    if !payload.latitude.is_finite() || !(-90.0..=90.0).contains(&payload.latitude) {
        return Err(AppError::BadRequest("latitude must be within [-90, 90]".to_string()));
    }
    if !payload.longitude.is_finite() || !(-180.0..=180.0).contains(&payload.longitude) {
        return Err(AppError::BadRequest(
            "longitude must be within [-180, 180]".to_string(),
        ));
    }

    let sample = Position::new(
        payload.latitude,
        payload.longitude,
        payload.timestamp.unwrap_or_else(Utc::now),
    );
    enqueue_position(&state, PositionEvent::Sample(sample)).await?;

    Ok(StatusCode::ACCEPTED)
}

async fn report_gps_status(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GpsStatusRequest>,
) -> Result<StatusCode, AppError> {
    enqueue_position(&state, PositionEvent::Failure(payload.status)).await?;
    Ok(StatusCode::ACCEPTED)
}
