// ==========================================
// 设备维保管理系统 - 引用校验器
// ==========================================
// 职责: 写入前确认请求中的外部 ID 存在
// 红线: 无副作用，只读当前作用域
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::maintenance::UsedStockItem;
use crate::domain::types::EntityKind;
use crate::repository::store::EntityScope;

/// 引用校验器
///
/// 在调用方的作用域内校验，校验结果与随后的写入看到同一份数据
pub struct ReferenceValidator {}

impl Default for ReferenceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 存在性查询
    pub fn exists<S>(&self, scope: &S, kind: EntityKind, id: &str) -> ApiResult<bool>
    where
        S: EntityScope + ?Sized,
    {
        Ok(scope.exists(kind, id)?)
    }

    /// 要求引用存在，否则返回 InvalidReference
    pub fn require<S>(&self, scope: &S, kind: EntityKind, id: &str) -> ApiResult<()>
    where
        S: EntityScope + ?Sized,
    {
        if self.exists(scope, kind, id)? {
            Ok(())
        } else {
            tracing::debug!(%kind, id, "引用校验失败");
            Err(ApiError::InvalidReference {
                kind,
                id: id.to_string(),
            })
        }
    }

    /// 可选引用（None 视为通过）
    pub fn require_optional<S>(&self, scope: &S, kind: EntityKind, id: Option<&str>) -> ApiResult<()>
    where
        S: EntityScope + ?Sized,
    {
        match id {
            Some(id) => self.require(scope, kind, id),
            None => Ok(()),
        }
    }

    /// 占用明细中的备件必须全部存在；按明细顺序报告第一个缺失项
    pub fn require_stock_items<S>(&self, scope: &S, entries: &[UsedStockItem]) -> ApiResult<()>
    where
        S: EntityScope + ?Sized,
    {
        for entry in entries {
            if !self.exists(scope, EntityKind::StockItem, &entry.stock_id)? {
                return Err(ApiError::UnknownStockItem {
                    stock_id: entry.stock_id.clone(),
                });
            }
        }
        Ok(())
    }
}
