use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Json, Query, State};

use super::common::{parse_query, run_blocking, HttpError};
use crate::api::dto::{ActionLogQuery, ReportQuery};
use crate::app::state::AppState;
use crate::domain::action_log::ActionLog;
use crate::domain::report::{ScheduledMaintenanceRow, UsedStockReportRow};
use crate::repository::store::EntityStore;

// ==========================================
// 报表 / 操作日志
// ==========================================

/// GET /reports/used-stock?month=&year=
pub(super) async fn used_stock_report<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<Vec<UsedStockReportRow>>, HttpError> {
    let query = parse_query(query)?;
    let rows = run_blocking(move || state.report_api.used_stock_report(&query)).await?;
    Ok(Json(rows))
}

/// GET /reports/scheduled-maintenances?month=&year=
pub(super) async fn scheduled_maintenance_report<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<Vec<ScheduledMaintenanceRow>>, HttpError> {
    let query = parse_query(query)?;
    let rows =
        run_blocking(move || state.report_api.scheduled_maintenance_report(&query)).await?;
    Ok(Json(rows))
}

/// GET /action-logs?limit=
pub(super) async fn list_action_logs<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ActionLogQuery>, QueryRejection>,
) -> Result<Json<Vec<ActionLog>>, HttpError> {
    let query = parse_query(query)?;
    let logs = run_blocking(move || state.report_api.list_action_logs(query.limit)).await?;
    Ok(Json(logs))
}
