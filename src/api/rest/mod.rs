pub mod fare;
pub mod positions;
pub mod trip;
pub mod ws;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::engine::tariff::{self, TariffCatalog};
use crate::models::meter::{MeterSnapshot, MeterStatus};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(trip::router())
        .merge(fare::router())
        .merge(positions::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/tariff", get(tariff_catalog))
        .route("/meter", get(meter))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    meter: MeterStatus,
    trips: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        meter: state.snapshot_rx.borrow().status,
        trips: state.summaries.len(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}

async fn tariff_catalog() -> Json<TariffCatalog> {
    Json(tariff::catalog())
}

async fn meter(State(state): State<Arc<AppState>>) -> Json<MeterSnapshot> {
    Json(state.snapshot())
}
