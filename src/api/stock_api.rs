// ==========================================
// 设备维保管理系统 - 备件库存 API
// ==========================================
// 职责: 备件 CRUD
// 说明: 删除被维保记录引用的备件是允许的，之后对其的返还为空操作
// ==========================================

use std::sync::Arc;

use crate::api::dto::StockRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::stock::StockItem;
use crate::domain::types::EntityKind;
use crate::repository::store::{EntityScope, EntityStore, MaintenanceStore, StockStore};

pub struct StockApi<S> {
    store: Arc<S>,
}

impl<S: EntityStore> StockApi<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list_stock(&self) -> ApiResult<Vec<StockItem>> {
        let scope = self.store.scope()?;
        Ok(scope.list_stock()?)
    }

    pub fn get_stock(&self, id: &str) -> ApiResult<StockItem> {
        let scope = self.store.scope()?;
        scope.find_stock(id)?.ok_or_else(|| not_found(id))
    }

    pub fn create_stock(&self, request: StockRequest) -> ApiResult<StockItem> {
        let item = request.into_stock_item(uuid::Uuid::new_v4().to_string())?;

        let mut scope = self.store.scope()?;
        scope.insert_stock(&item)?;
        scope.commit()?;

        tracing::info!(stock_id = %item.id, quantity = item.quantity, "备件已新建");
        Ok(item)
    }

    /// 修改备件（含直接盘点在库数量）
    pub fn update_stock(&self, id: &str, request: StockRequest) -> ApiResult<StockItem> {
        let item = request.into_stock_item(id.to_string())?;

        let mut scope = self.store.scope()?;
        if !scope.update_stock(&item)? {
            return Err(not_found(id));
        }
        scope.commit()?;
        Ok(item)
    }

    pub fn delete_stock(&self, id: &str) -> ApiResult<()> {
        let mut scope = self.store.scope()?;
        if !scope.exists(EntityKind::StockItem, id)? {
            return Err(not_found(id));
        }

        let referencing = scope
            .list_maintenance()?
            .iter()
            .filter(|record| record.reserved_quantity(id) > 0)
            .count();
        if referencing > 0 {
            tracing::warn!(
                stock_id = %id,
                referencing,
                "备件仍被维保记录引用，后续返还将跳过"
            );
        }

        scope.delete_stock(id)?;
        scope.commit()?;
        Ok(())
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("{}(id={})不存在", EntityKind::StockItem, id))
}
