// ==========================================
// 设备维保管理系统 - HTTP 路由（按域拆分）
// ==========================================
// 职责: HTTP 路由定义,连接前端与后端 API
// 约定: API 调用为同步阻塞，一律在 spawn_blocking 中执行
// ==========================================

mod common;
mod machine;
mod maintenance;
mod operator;
mod report;
mod stock;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::app::state::AppState;
use crate::repository::store::EntityStore;

pub use common::{ErrorResponse, HttpError};

/// 构建完整路由（挂载在 /api 下，全部路由带宽松 CORS）
pub fn router<S>(state: Arc<AppState<S>>) -> Router
where
    S: EntityStore + 'static,
{
    let api = Router::new()
        .route("/health", get(common::health))
        // 机台 / 传感器
        .route(
            "/machines",
            get(machine::list_machines::<S>).post(machine::create_machine::<S>),
        )
        .route(
            "/machines/:id",
            get(machine::get_machine::<S>)
                .put(machine::update_machine::<S>)
                .delete(machine::delete_machine::<S>),
        )
        .route(
            "/machines/:id/sensors",
            get(machine::list_sensors::<S>).post(machine::add_sensor::<S>),
        )
        // 操作员
        .route(
            "/operators",
            get(operator::list_operators::<S>).post(operator::create_operator::<S>),
        )
        .route(
            "/operators/:id",
            get(operator::get_operator::<S>)
                .put(operator::update_operator::<S>)
                .delete(operator::delete_operator::<S>),
        )
        // 备件
        .route(
            "/stock",
            get(stock::list_stock::<S>).post(stock::create_stock::<S>),
        )
        .route(
            "/stock/:id",
            get(stock::get_stock::<S>)
                .put(stock::update_stock::<S>)
                .delete(stock::delete_stock::<S>),
        )
        // 维保记录
        .route(
            "/maintenance",
            get(maintenance::list_maintenance::<S>).post(maintenance::create_maintenance::<S>),
        )
        .route(
            "/maintenance/:id",
            get(maintenance::get_maintenance::<S>)
                .put(maintenance::update_maintenance::<S>)
                .delete(maintenance::delete_maintenance::<S>),
        )
        // 报表 / 审计
        .route("/reports/used-stock", get(report::used_stock_report::<S>))
        .route(
            "/reports/scheduled-maintenances",
            get(report::scheduled_maintenance_report::<S>),
        )
        .route("/action-logs", get(report::list_action_logs::<S>));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
