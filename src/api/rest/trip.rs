use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::meter::MeterCommand;
use crate::engine::queue::send_command;
use crate::error::AppError;
use crate::models::meter::MeterSnapshot;
use crate::models::trip::{StopKind, TripSummary};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trip/start", post(start_trip))
        .route("/trip/pause", post(pause_trip))
        .route("/trip/resume", post(resume_trip))
        .route("/trip/stop", post(stop_trip))
        .route("/trip/stops", post(add_stop))
        .route("/trip/simulation", post(set_simulation))
        .route("/trips", get(list_trips))
        .route("/trips/:id", get(get_trip))
}

#[derive(Deserialize)]
pub struct AddStopRequest {
    pub kind: StopKind,
}

#[derive(Deserialize)]
pub struct SimulationRequest {
    pub enabled: bool,
}

async fn start_trip(State(state): State<Arc<AppState>>) -> Result<Json<MeterSnapshot>, AppError> {
    Ok(Json(send_command(&state, MeterCommand::Start).await?))
}

async fn pause_trip(State(state): State<Arc<AppState>>) -> Result<Json<MeterSnapshot>, AppError> {
    Ok(Json(send_command(&state, MeterCommand::Pause).await?))
}

async fn resume_trip(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MeterSnapshot>, AppError> {
    Ok(Json(send_command(&state, MeterCommand::Resume).await?))
}

async fn stop_trip(State(state): State<Arc<AppState>>) -> Result<Json<TripSummary>, AppError> {
    let snapshot = send_command(&state, MeterCommand::Stop).await?;
    let summary = snapshot
        .last_summary
        .ok_or_else(|| AppError::Internal("stopped trip left no summary".to_string()))?;

    Ok(Json(summary))
}

async fn add_stop(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddStopRequest>,
) -> Result<Json<MeterSnapshot>, AppError> {
    Ok(Json(
        send_command(&state, MeterCommand::AddStop(payload.kind)).await?,
    ))
}

async fn set_simulation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SimulationRequest>,
) -> Result<Json<MeterSnapshot>, AppError> {
    Ok(Json(
        send_command(&state, MeterCommand::SetSimulation(payload.enabled)).await?,
    ))
}

async fn list_trips(State(state): State<Arc<AppState>>) -> Json<Vec<TripSummary>> {
    let mut trips: Vec<TripSummary> = state
        .summaries
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    trips.sort_by_key(|trip| trip.completed_at);

    Json(trips)
}

async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripSummary>, AppError> {
    let trip = state
        .summaries
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("trip {} not found", id)))?;

    Ok(Json(trip.value().clone()))
}
