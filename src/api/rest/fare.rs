use std::sync::Arc;

use axum::extract::State;
use axum::routing::put;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::engine::meter::MeterCommand;
use crate::engine::queue::send_command;
use crate::error::AppError;
use crate::models::meter::MeterSnapshot;
use crate::models::surcharge::ErrandKind;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/route", put(select_route))
        .route("/special-zone", put(set_special_zone))
        .route("/special-zone/zone", put(select_zone))
        .route("/surcharges/pet", put(set_pet))
        .route("/surcharges/errand", put(set_errand))
        .route("/surcharges/passengers", put(set_passengers))
}

#[derive(Deserialize)]
pub struct SelectRouteRequest {
    pub route_id: String,
    pub sub_route_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SpecialZoneRequest {
    pub active: bool,
}

#[derive(Deserialize)]
pub struct SelectZoneRequest {
    pub zone: Option<String>,
}

#[derive(Deserialize)]
pub struct PetRequest {
    pub with_cage: Option<bool>,
}

#[derive(Deserialize)]
pub struct ErrandRequest {
    pub kind: Option<ErrandKind>,
}

#[derive(Deserialize)]
pub struct PassengersRequest {
    pub adults: u32,
    pub children: u32,
}

async fn select_route(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SelectRouteRequest>,
) -> Result<Json<MeterSnapshot>, AppError> {
    if payload.route_id.trim().is_empty() {
        return Err(AppError::BadRequest("route_id cannot be empty".to_string()));
    }

    let command = MeterCommand::SelectRoute {
        route_id: payload.route_id,
        sub_route_id: payload.sub_route_id,
    };
    Ok(Json(send_command(&state, command).await?))
}

async fn set_special_zone(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SpecialZoneRequest>,
) -> Result<Json<MeterSnapshot>, AppError> {
    Ok(Json(
        send_command(&state, MeterCommand::SetSpecialZone(payload.active)).await?,
    ))
}

async fn select_zone(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SelectZoneRequest>,
) -> Result<Json<MeterSnapshot>, AppError> {
    Ok(Json(
        send_command(&state, MeterCommand::SelectZone(payload.zone)).await?,
    ))
}

async fn set_pet(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PetRequest>,
) -> Result<Json<MeterSnapshot>, AppError> {
    Ok(Json(
        send_command(&state, MeterCommand::SetPet(payload.with_cage)).await?,
    ))
}

async fn set_errand(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ErrandRequest>,
) -> Result<Json<MeterSnapshot>, AppError> {
    Ok(Json(
        send_command(&state, MeterCommand::SetErrand(payload.kind)).await?,
    ))
}

async fn set_passengers(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PassengersRequest>,
) -> Result<Json<MeterSnapshot>, AppError> {
    let command = MeterCommand::SetPassengers {
        adults: payload.adults,
        children: payload.children,
    };
    Ok(Json(send_command(&state, command).await?))
}
