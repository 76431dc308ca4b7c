// ==========================================
// 设备维保管理系统 - 操作员 API
// ==========================================
// 红线: 删除操作员只解除机台引用，不删除机台
// ==========================================

use std::sync::Arc;

use crate::api::dto::OperatorRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::operator::Operator;
use crate::domain::types::EntityKind;
use crate::repository::store::{EntityScope, EntityStore, MachineStore, OperatorStore};

pub struct OperatorApi<S> {
    store: Arc<S>,
}

impl<S: EntityStore> OperatorApi<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list_operators(&self) -> ApiResult<Vec<Operator>> {
        let scope = self.store.scope()?;
        Ok(scope.list_operators()?)
    }

    pub fn get_operator(&self, id: &str) -> ApiResult<Operator> {
        let scope = self.store.scope()?;
        scope.find_operator(id)?.ok_or_else(|| not_found(id))
    }

    pub fn create_operator(&self, request: OperatorRequest) -> ApiResult<Operator> {
        let operator = request.into_operator(uuid::Uuid::new_v4().to_string())?;

        let mut scope = self.store.scope()?;
        scope.insert_operator(&operator)?;
        scope.commit()?;
        Ok(operator)
    }

    /// 重命名操作员
    pub fn update_operator(&self, id: &str, request: OperatorRequest) -> ApiResult<Operator> {
        let operator = request.into_operator(id.to_string())?;

        let mut scope = self.store.scope()?;
        if !scope.update_operator(&operator)? {
            return Err(not_found(id));
        }
        scope.commit()?;
        Ok(operator)
    }

    /// 删除操作员，并解除所有机台对其的引用
    pub fn delete_operator(&self, id: &str) -> ApiResult<()> {
        let mut scope = self.store.scope()?;
        if !scope.exists(EntityKind::Operator, id)? {
            return Err(not_found(id));
        }

        let unassigned = scope.clear_operator(id)?;
        scope.delete_operator(id)?;
        scope.commit()?;

        tracing::info!(operator_id = %id, unassigned, "操作员已删除，已解除机台引用");
        Ok(())
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("{}(id={})不存在", EntityKind::Operator, id))
}
