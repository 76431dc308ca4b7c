use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;

use super::common::{parse_body, run_blocking, HttpError};
use crate::api::dto::OperatorRequest;
use crate::app::state::AppState;
use crate::domain::operator::Operator;
use crate::repository::store::EntityStore;

// ==========================================
// 操作员
// ==========================================

pub(super) async fn list_operators<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Operator>>, HttpError> {
    let operators = run_blocking(move || state.operator_api.list_operators()).await?;
    Ok(Json(operators))
}

pub(super) async fn get_operator<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Operator>, HttpError> {
    let operator = run_blocking(move || state.operator_api.get_operator(&id)).await?;
    Ok(Json(operator))
}

pub(super) async fn create_operator<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<OperatorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Operator>), HttpError> {
    let request = parse_body(body)?;
    let operator = run_blocking(move || state.operator_api.create_operator(request)).await?;
    Ok((StatusCode::CREATED, Json(operator)))
}

pub(super) async fn update_operator<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Result<Json<OperatorRequest>, JsonRejection>,
) -> Result<Json<Operator>, HttpError> {
    let request = parse_body(body)?;
    let operator =
        run_blocking(move || state.operator_api.update_operator(&id, request)).await?;
    Ok(Json(operator))
}

/// 删除操作员（其负责的机台自动解除指派）
pub(super) async fn delete_operator<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    run_blocking(move || state.operator_api.delete_operator(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
