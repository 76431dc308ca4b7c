use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;

use super::common::{parse_body, run_blocking, HttpError};
use crate::api::dto::MaintenanceRequest;
use crate::app::state::AppState;
use crate::domain::maintenance::Maintenance;
use crate::repository::store::EntityStore;

// ==========================================
// 维保记录（库存联动）
// ==========================================

pub(super) async fn list_maintenance<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Maintenance>>, HttpError> {
    let records = run_blocking(move || state.maintenance_api.list_maintenance()).await?;
    Ok(Json(records))
}

pub(super) async fn get_maintenance<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Maintenance>, HttpError> {
    let record = run_blocking(move || state.maintenance_api.get_maintenance(&id)).await?;
    Ok(Json(record))
}

/// 新建维保记录并扣减备件
pub(super) async fn create_maintenance<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<MaintenanceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Maintenance>), HttpError> {
    let request = parse_body(body)?;
    let record =
        run_blocking(move || state.maintenance_api.create_maintenance(request)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// 修改维保记录（先归还旧用量，再扣减新用量）
pub(super) async fn update_maintenance<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Result<Json<MaintenanceRequest>, JsonRejection>,
) -> Result<Json<Maintenance>, HttpError> {
    let request = parse_body(body)?;
    let record =
        run_blocking(move || state.maintenance_api.update_maintenance(&id, request)).await?;
    Ok(Json(record))
}

/// 删除维保记录并归还备件
pub(super) async fn delete_maintenance<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    run_blocking(move || state.maintenance_api.delete_maintenance(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
