// ==========================================
// 设备维保管理系统 - 维保记录 API
// ==========================================
// 职责: 维保记录的查询与写入
// 流程: 校验请求 → 开作用域 → 引用校验 → 台账引擎 → 操作日志 → 提交
// 红线: 任一步失败都不提交，库存与记录保持调用前状态
// ==========================================

use std::sync::Arc;

use serde_json::json;

use crate::api::dto::MaintenanceRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::ReferenceValidator;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::maintenance::Maintenance;
use crate::domain::types::EntityKind;
use crate::engine::stock_ledger::{LedgerOutcome, StockLedgerEngine};
use crate::repository::store::{ActionLogStore, EntityScope, EntityStore, MaintenanceStore};

// ==========================================
// MaintenanceApi - 维保记录 API
// ==========================================
pub struct MaintenanceApi<S> {
    store: Arc<S>,
    engine: StockLedgerEngine,
    validator: ReferenceValidator,
}

impl<S: EntityStore> MaintenanceApi<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            engine: StockLedgerEngine::new(),
            validator: ReferenceValidator::new(),
        }
    }

    /// 查询全部维保记录
    pub fn list_maintenance(&self) -> ApiResult<Vec<Maintenance>> {
        let scope = self.store.scope()?;
        Ok(scope.list_maintenance()?)
    }

    /// 查询单条维保记录
    pub fn get_maintenance(&self, id: &str) -> ApiResult<Maintenance> {
        let scope = self.store.scope()?;
        scope
            .find_maintenance(id)?
            .ok_or_else(|| not_found(id))
    }

    /// 新建维保记录
    ///
    /// # 返回
    /// - Ok(Maintenance): 已落库的记录（含生成的 ID，状态为 scheduled）
    /// - Err(InvalidReference): 机台不存在
    /// - Err(UnknownStockItem / InsufficientStock): 备件不存在或不足
    pub fn create_maintenance(&self, request: MaintenanceRequest) -> ApiResult<Maintenance> {
        let draft = request.into_draft()?;

        let mut scope = self.store.scope()?;
        self.validator
            .require(&scope, EntityKind::Machine, &draft.machine_id)?;
        self.validator
            .require_stock_items(&scope, &draft.used_stock)?;

        let outcome = self.engine.create_maintenance(&mut scope, draft)?;
        scope.insert_action_log(&audit_log(ActionType::CreateMaintenance, &outcome))?;
        scope.commit()?;

        Ok(outcome.record)
    }

    /// 修改维保记录（返还旧占用，扣减新占用）
    pub fn update_maintenance(
        &self,
        id: &str,
        request: MaintenanceRequest,
    ) -> ApiResult<Maintenance> {
        let draft = request.into_draft()?;

        let mut scope = self.store.scope()?;
        if !self.validator.exists(&scope, EntityKind::Maintenance, id)? {
            return Err(not_found(id));
        }
        self.validator
            .require(&scope, EntityKind::Machine, &draft.machine_id)?;
        self.validator
            .require_stock_items(&scope, &draft.used_stock)?;

        let outcome = self.engine.update_maintenance(&mut scope, id, draft)?;
        scope.insert_action_log(&audit_log(ActionType::UpdateMaintenance, &outcome))?;
        scope.commit()?;

        Ok(outcome.record)
    }

    /// 删除维保记录（返还全部占用）
    pub fn delete_maintenance(&self, id: &str) -> ApiResult<()> {
        let mut scope = self.store.scope()?;
        let outcome = self.engine.delete_maintenance(&mut scope, id)?;
        scope.insert_action_log(&audit_log(ActionType::DeleteMaintenance, &outcome))?;
        scope.commit()?;
        Ok(())
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("{}(id={})不存在", EntityKind::Maintenance, id))
}

fn audit_log(action_type: ActionType, outcome: &LedgerOutcome) -> ActionLog {
    let record = &outcome.record;
    ActionLog::new(action_type, record.id.clone())
        .with_payload(&json!({
            "machineId": record.machine_id,
            "date": record.date,
            "usedStock": record.used_stock,
            "deltas": outcome.deltas,
        }))
        .with_detail(format!(
            "{} machine={} date={} entries={}",
            action_type.as_str(),
            record.machine_id,
            record.date,
            record.used_stock.len()
        ))
}
