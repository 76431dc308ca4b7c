// ==========================================
// 设备维保管理系统 - 报表与审计 API
// ==========================================
// 职责: 备件消耗报表、已计划维保报表、操作日志查询
// 红线: 只读，不提交作用域
// ==========================================

use std::sync::Arc;

use crate::api::dto::ReportQuery;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::action_log::ActionLog;
use crate::domain::report::{ScheduledMaintenanceRow, UsedStockReportRow};
use crate::engine::report::ReportEngine;
use crate::repository::store::{ActionLogStore, EntityStore};

/// 单次查询的日志条数上限
pub const MAX_ACTION_LOG_LIMIT: usize = 1_000;

pub struct ReportApi<S> {
    store: Arc<S>,
    config: Arc<ConfigManager>,
    engine: ReportEngine,
}

impl<S: EntityStore> ReportApi<S> {
    pub fn new(store: Arc<S>, config: Arc<ConfigManager>) -> Self {
        Self {
            store,
            config,
            engine: ReportEngine::new(),
        }
    }

    /// 备件消耗报表（按日期倒序）
    pub fn used_stock_report(&self, query: &ReportQuery) -> ApiResult<Vec<UsedStockReportRow>> {
        let filter = query.filter()?;
        let scope = self.store.scope()?;
        Ok(self.engine.used_stock_report(&scope, filter)?)
    }

    /// 已计划维保报表（按日期正序）
    pub fn scheduled_maintenance_report(
        &self,
        query: &ReportQuery,
    ) -> ApiResult<Vec<ScheduledMaintenanceRow>> {
        let filter = query.filter()?;
        let scope = self.store.scope()?;
        Ok(self.engine.scheduled_maintenance_report(&scope, filter)?)
    }

    /// 最近的操作日志
    ///
    /// limit 缺省取配置 action_log_default_limit
    pub fn list_action_logs(&self, limit: Option<usize>) -> ApiResult<Vec<ActionLog>> {
        let limit = match limit {
            Some(0) => return Err(ApiError::InvalidInput("limit 必须大于 0".to_string())),
            Some(n) => n.min(MAX_ACTION_LOG_LIMIT),
            None => self.config.action_log_default_limit()?,
        };

        let scope = self.store.scope()?;
        Ok(scope.list_action_logs(limit)?)
    }
}
