use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;

use super::common::{parse_body, run_blocking, HttpError};
use crate::api::dto::StockRequest;
use crate::app::state::AppState;
use crate::domain::stock::StockItem;
use crate::repository::store::EntityStore;

// ==========================================
// 备件
// ==========================================

pub(super) async fn list_stock<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<StockItem>>, HttpError> {
    let items = run_blocking(move || state.stock_api.list_stock()).await?;
    Ok(Json(items))
}

pub(super) async fn get_stock<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<StockItem>, HttpError> {
    let item = run_blocking(move || state.stock_api.get_stock(&id)).await?;
    Ok(Json(item))
}

pub(super) async fn create_stock<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<StockRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StockItem>), HttpError> {
    let request = parse_body(body)?;
    let item = run_blocking(move || state.stock_api.create_stock(request)).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub(super) async fn update_stock<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Result<Json<StockRequest>, JsonRejection>,
) -> Result<Json<StockItem>, HttpError> {
    let request = parse_body(body)?;
    let item = run_blocking(move || state.stock_api.update_stock(&id, request)).await?;
    Ok(Json(item))
}

pub(super) async fn delete_stock<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    run_blocking(move || state.stock_api.delete_stock(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
