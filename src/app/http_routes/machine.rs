use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;

use super::common::{parse_body, run_blocking, HttpError};
use crate::api::dto::{MachineRequest, SensorRequest};
use crate::app::state::AppState;
use crate::domain::machine::{Machine, Sensor};
use crate::repository::store::EntityStore;

// ==========================================
// 机台 / 传感器
// ==========================================

pub(super) async fn list_machines<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Machine>>, HttpError> {
    let machines = run_blocking(move || state.machine_api.list_machines()).await?;
    Ok(Json(machines))
}

pub(super) async fn get_machine<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Machine>, HttpError> {
    let machine = run_blocking(move || state.machine_api.get_machine(&id)).await?;
    Ok(Json(machine))
}

pub(super) async fn create_machine<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<MachineRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Machine>), HttpError> {
    let request = parse_body(body)?;
    let machine = run_blocking(move || state.machine_api.create_machine(request)).await?;
    Ok((StatusCode::CREATED, Json(machine)))
}

pub(super) async fn update_machine<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Result<Json<MachineRequest>, JsonRejection>,
) -> Result<Json<Machine>, HttpError> {
    let request = parse_body(body)?;
    let machine = run_blocking(move || state.machine_api.update_machine(&id, request)).await?;
    Ok(Json(machine))
}

pub(super) async fn delete_machine<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    run_blocking(move || state.machine_api.delete_machine(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_sensors<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Sensor>>, HttpError> {
    let sensors = run_blocking(move || state.machine_api.list_sensors(&id)).await?;
    Ok(Json(sensors))
}

pub(super) async fn add_sensor<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Result<Json<SensorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Sensor>), HttpError> {
    let request = parse_body(body)?;
    let sensor = run_blocking(move || state.machine_api.add_sensor(&id, request)).await?;
    Ok((StatusCode::CREATED, Json(sensor)))
}
