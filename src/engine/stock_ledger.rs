// ==========================================
// 设备维保管理系统 - 备件台账引擎
// ==========================================
// 职责: 维保记录新建/修改/删除时扣减与返还备件库存
// 红线: 任何备件在库数量不得为负
// 红线: 失败时撤销本次调用已生效的全部库存变化，再返回错误
// 红线: 明细按录入顺序处理，只报告第一个不足的备件
// ==========================================
// 不变量:
//   在库数量 = 实物数量 - Σ 现存维保记录对该备件的占用
// 每次扣减都恰好对应一次返还（修改掉或删除时）
// ==========================================
// 调用约定: 调用方持有作用域，引擎的整个调用在同一作用域内完成
// ==========================================

use crate::domain::action_log::StockDelta;
use crate::domain::maintenance::{Maintenance, MaintenanceDraft, UsedStockItem};
use crate::domain::types::MaintenanceStatus;
use crate::engine::compensation::{CompensationAction, CompensationLog};
use crate::engine::error::{LedgerError, LedgerResult};
use crate::repository::error::RepositoryError;
use crate::repository::store::{MaintenanceStore, StockStore};

/// 一次成功写入的结果
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerOutcome {
    /// 写入后的记录（删除时为被删除的记录）
    pub record: Maintenance,
    /// 按备件汇总的库存净变化
    pub deltas: Vec<StockDelta>,
}

// ==========================================
// StockLedgerEngine - 备件台账引擎
// ==========================================
pub struct StockLedgerEngine {
    // 无状态引擎，存储由调用方的作用域提供
}

impl Default for StockLedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StockLedgerEngine {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 单步操作
    // ==========================================

    /// 扣减备件
    ///
    /// # 错误
    /// - `InvalidQuantity`: quantity <= 0
    /// - `UnknownStockItem`: 备件不存在
    /// - `InsufficientStock`: 在库数量 < quantity
    pub fn reserve<S>(&self, store: &mut S, stock_id: &str, quantity: i64) -> LedgerResult<()>
    where
        S: StockStore + ?Sized,
    {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity {
                stock_id: stock_id.to_string(),
                quantity,
            });
        }

        let item = store
            .find_stock(stock_id)?
            .ok_or_else(|| LedgerError::UnknownStockItem {
                stock_id: stock_id.to_string(),
            })?;

        if !item.can_reserve(quantity) {
            return Err(LedgerError::InsufficientStock {
                stock_id: item.id,
                name: item.name,
                requested: quantity,
                available: item.quantity,
            });
        }

        let remaining = item.quantity - quantity;
        store.set_stock_quantity(stock_id, remaining)?;
        tracing::debug!(stock_id, quantity, remaining, "备件扣减");
        Ok(())
    }

    /// 返还备件
    ///
    /// # 返回
    /// - `Ok(true)`: 已返还
    /// - `Ok(false)`: 备件已被删除，跳过
    pub fn release<S>(&self, store: &mut S, stock_id: &str, quantity: i64) -> LedgerResult<bool>
    where
        S: StockStore + ?Sized,
    {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity {
                stock_id: stock_id.to_string(),
                quantity,
            });
        }

        let Some(item) = store.find_stock(stock_id)? else {
            tracing::warn!(stock_id, quantity, "备件不存在，跳过返还");
            return Ok(false);
        };

        let restored = item.quantity.checked_add(quantity).ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "quantity".to_string(),
                message: format!("返还后数量溢出: {} + {}", item.quantity, quantity),
            }
        })?;
        store.set_stock_quantity(stock_id, restored)?;
        tracing::debug!(stock_id, quantity, restored, "备件返还");
        Ok(true)
    }

    // ==========================================
    // 维保记录写入
    // ==========================================

    /// 新建维保记录: 逐项扣减，全部成功后落库
    ///
    /// 新记录状态固定为 Scheduled
    pub fn create_maintenance<S>(
        &self,
        store: &mut S,
        draft: MaintenanceDraft,
    ) -> LedgerResult<LedgerOutcome>
    where
        S: StockStore + MaintenanceStore + ?Sized,
    {
        let record = Maintenance {
            id: uuid::Uuid::new_v4().to_string(),
            machine_id: draft.machine_id,
            date: draft.date,
            description: draft.description,
            status: MaintenanceStatus::Scheduled,
            used_stock: draft.used_stock,
        };

        let mut log = CompensationLog::new();
        let result = self
            .reserve_entries(store, &record.used_stock, &mut log)
            .and_then(|_| store.insert_maintenance(&record).map_err(LedgerError::from));

        if let Err(e) = result {
            return Err(self.abort(store, log, "create", &record.id, e));
        }

        tracing::info!(
            maintenance_id = %record.id,
            machine_id = %record.machine_id,
            entries = record.used_stock.len(),
            "维保记录已新建"
        );
        Ok(LedgerOutcome {
            deltas: log.net_deltas(),
            record,
        })
    }

    /// 修改维保记录: 先返还旧占用，再扣减新占用，成功后整体替换
    ///
    /// draft.status 为 None 时保留原状态
    pub fn update_maintenance<S>(
        &self,
        store: &mut S,
        id: &str,
        draft: MaintenanceDraft,
    ) -> LedgerResult<LedgerOutcome>
    where
        S: StockStore + MaintenanceStore + ?Sized,
    {
        let existing = store
            .find_maintenance(id)?
            .ok_or_else(|| LedgerError::NotFound { id: id.to_string() })?;

        let record = Maintenance {
            id: existing.id.clone(),
            machine_id: draft.machine_id,
            date: draft.date,
            description: draft.description,
            status: draft.status.unwrap_or(existing.status),
            used_stock: draft.used_stock,
        };

        let mut log = CompensationLog::new();
        let result = self
            .release_entries(store, &existing.used_stock, &mut log)
            .and_then(|_| self.reserve_entries(store, &record.used_stock, &mut log))
            .and_then(|_| match store.update_maintenance(&record)? {
                true => Ok(()),
                false => Err(LedgerError::NotFound { id: id.to_string() }),
            });

        if let Err(e) = result {
            return Err(self.abort(store, log, "update", id, e));
        }

        tracing::info!(
            maintenance_id = %record.id,
            released = existing.used_stock.len(),
            reserved = record.used_stock.len(),
            "维保记录已修改"
        );
        Ok(LedgerOutcome {
            deltas: log.net_deltas(),
            record,
        })
    }

    /// 删除维保记录: 返还全部占用后删除
    ///
    /// 不会因库存原因失败；已删除的备件跳过返还
    pub fn delete_maintenance<S>(&self, store: &mut S, id: &str) -> LedgerResult<LedgerOutcome>
    where
        S: StockStore + MaintenanceStore + ?Sized,
    {
        let existing = store
            .find_maintenance(id)?
            .ok_or_else(|| LedgerError::NotFound { id: id.to_string() })?;

        let mut log = CompensationLog::new();
        let result = self
            .release_entries(store, &existing.used_stock, &mut log)
            .and_then(|_| match store.delete_maintenance(id)? {
                true => Ok(()),
                false => Err(LedgerError::NotFound { id: id.to_string() }),
            });

        if let Err(e) = result {
            return Err(self.abort(store, log, "delete", id, e));
        }

        tracing::info!(maintenance_id = %id, released = log.len(), "维保记录已删除");
        Ok(LedgerOutcome {
            deltas: log.net_deltas(),
            record: existing,
        })
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn reserve_entries<S>(
        &self,
        store: &mut S,
        entries: &[UsedStockItem],
        log: &mut CompensationLog,
    ) -> LedgerResult<()>
    where
        S: StockStore + ?Sized,
    {
        for entry in entries {
            self.reserve(store, &entry.stock_id, entry.quantity)?;
            log.record(CompensationAction::Release {
                stock_id: entry.stock_id.clone(),
                quantity: entry.quantity,
            });
        }
        Ok(())
    }

    fn release_entries<S>(
        &self,
        store: &mut S,
        entries: &[UsedStockItem],
        log: &mut CompensationLog,
    ) -> LedgerResult<()>
    where
        S: StockStore + ?Sized,
    {
        for entry in entries {
            if self.release(store, &entry.stock_id, entry.quantity)? {
                log.record(CompensationAction::Reserve {
                    stock_id: entry.stock_id.clone(),
                    quantity: entry.quantity,
                });
            }
        }
        Ok(())
    }

    /// 倒序执行补偿动作，返回应交给调用方的错误
    fn abort<S>(
        &self,
        store: &mut S,
        mut log: CompensationLog,
        operation: &'static str,
        maintenance_id: &str,
        err: LedgerError,
    ) -> LedgerError
    where
        S: StockStore + ?Sized,
    {
        tracing::warn!(
            operation,
            maintenance_id,
            error = %err,
            compensations = log.len(),
            "维保写入失败，撤销已生效的库存变化"
        );

        for action in log.drain_reversed() {
            let result = match &action {
                CompensationAction::Release { stock_id, quantity } => {
                    self.release(store, stock_id, *quantity).map(|_| ())
                }
                CompensationAction::Reserve { stock_id, quantity } => {
                    self.reserve(store, stock_id, *quantity)
                }
            };

            if let Err(compensation_err) = result {
                tracing::error!(
                    operation,
                    maintenance_id,
                    action = ?action,
                    error = %compensation_err,
                    "补偿动作执行失败"
                );
                return LedgerError::CompensationFailed {
                    original: err.to_string(),
                    message: compensation_err.to_string(),
                };
            }
        }

        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stock::StockItem;
    use crate::repository::memory_store::MemoryEntityStore;
    use crate::repository::store::{EntityScope, EntityStore};
    use chrono::NaiveDate;

    fn stock(id: &str, quantity: i64) -> StockItem {
        StockItem {
            id: id.to_string(),
            name: id.to_string(),
            quantity,
            unit: "pcs".to_string(),
            value: 0.5,
            location: "A1".to_string(),
        }
    }

    fn draft(entries: &[(&str, i64)]) -> MaintenanceDraft {
        MaintenanceDraft {
            machine_id: "m1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            description: "oil change".to_string(),
            status: None,
            used_stock: entries
                .iter()
                .map(|(id, q)| UsedStockItem::new(*id, *q))
                .collect(),
        }
    }

    fn setup(items: &[(&str, i64)]) -> MemoryEntityStore {
        let store = MemoryEntityStore::new();
        let mut scope = store.scope().unwrap();
        for (id, q) in items {
            scope.insert_stock(&stock(id, *q)).unwrap();
        }
        scope.commit().unwrap();
        store
    }

    fn quantity<S: StockStore>(scope: &S, id: &str) -> i64 {
        scope.find_stock(id).unwrap().unwrap().quantity
    }

    #[test]
    fn test_reserve_rejects_non_positive() {
        let store = setup(&[("bolt", 10)]);
        let mut scope = store.scope().unwrap();
        let engine = StockLedgerEngine::new();

        let err = engine.reserve(&mut scope, "bolt", 0).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidQuantity { .. }));
        assert_eq!(quantity(&scope, "bolt"), 10);
    }

    #[test]
    fn test_reserve_unknown_stock() {
        let store = setup(&[]);
        let mut scope = store.scope().unwrap();
        let err = StockLedgerEngine::new()
            .reserve(&mut scope, "ghost", 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownStockItem { stock_id } if stock_id == "ghost"));
    }

    #[test]
    fn test_release_missing_stock_is_noop() {
        let store = setup(&[]);
        let mut scope = store.scope().unwrap();
        let released = StockLedgerEngine::new()
            .release(&mut scope, "ghost", 3)
            .unwrap();
        assert!(!released);
    }

    #[test]
    fn test_create_then_insufficient() {
        let store = setup(&[("bolt", 10)]);
        let engine = StockLedgerEngine::new();
        let mut scope = store.scope().unwrap();

        let outcome = engine
            .create_maintenance(&mut scope, draft(&[("bolt", 7)]))
            .unwrap();
        assert_eq!(outcome.record.status, MaintenanceStatus::Scheduled);
        assert_eq!(outcome.deltas[0].delta, -7);
        assert_eq!(quantity(&scope, "bolt"), 3);

        let err = engine
            .create_maintenance(&mut scope, draft(&[("bolt", 5)]))
            .unwrap_err();
        match err {
            LedgerError::InsufficientStock {
                name,
                requested,
                available,
                ..
            } => {
                assert_eq!(name, "bolt");
                assert_eq!(requested, 5);
                assert_eq!(available, 3);
            }
            other => panic!("期望 InsufficientStock, 实际 {:?}", other),
        }
        assert_eq!(quantity(&scope, "bolt"), 3);
        assert_eq!(scope.list_maintenance().unwrap().len(), 1);
    }

    #[test]
    fn test_create_failure_on_later_entry_compensates_earlier() {
        let store = setup(&[("bolt", 10), ("nut", 1)]);
        let engine = StockLedgerEngine::new();
        let mut scope = store.scope().unwrap();

        let err = engine
            .create_maintenance(&mut scope, draft(&[("bolt", 4), ("nut", 2), ("washer", 1)]))
            .unwrap_err();

        // 只报告第一个失败项
        assert!(matches!(err, LedgerError::InsufficientStock { ref stock_id, .. } if stock_id == "nut"));
        assert_eq!(quantity(&scope, "bolt"), 10);
        assert_eq!(quantity(&scope, "nut"), 1);
        assert!(scope.list_maintenance().unwrap().is_empty());
    }

    #[test]
    fn test_update_swaps_reservation() {
        let store = setup(&[("bolt", 10), ("nut", 5)]);
        let engine = StockLedgerEngine::new();
        let mut scope = store.scope().unwrap();

        let created = engine
            .create_maintenance(&mut scope, draft(&[("bolt", 7)]))
            .unwrap();
        let mut next = draft(&[("bolt", 2), ("nut", 1)]);
        next.status = Some(MaintenanceStatus::InProgress);

        let outcome = engine
            .update_maintenance(&mut scope, &created.record.id, next)
            .unwrap();
        assert_eq!(outcome.record.status, MaintenanceStatus::InProgress);
        assert_eq!(quantity(&scope, "bolt"), 8);
        assert_eq!(quantity(&scope, "nut"), 4);

        let bolt_delta = outcome.deltas.iter().find(|d| d.stock_id == "bolt").unwrap();
        assert_eq!(bolt_delta.delta, 5);
    }

    #[test]
    fn test_update_keeps_status_when_omitted() {
        let store = setup(&[("bolt", 10)]);
        let engine = StockLedgerEngine::new();
        let mut scope = store.scope().unwrap();

        let created = engine
            .create_maintenance(&mut scope, draft(&[("bolt", 1)]))
            .unwrap();
        let mut next = draft(&[("bolt", 1)]);
        next.status = Some(MaintenanceStatus::Completed);
        engine
            .update_maintenance(&mut scope, &created.record.id, next)
            .unwrap();

        let outcome = engine
            .update_maintenance(&mut scope, &created.record.id, draft(&[("bolt", 2)]))
            .unwrap();
        assert_eq!(outcome.record.status, MaintenanceStatus::Completed);
    }

    #[test]
    fn test_update_failure_restores_pre_state() {
        let store = setup(&[("bolt", 10), ("nut", 0)]);
        let engine = StockLedgerEngine::new();
        let mut scope = store.scope().unwrap();

        let created = engine
            .create_maintenance(&mut scope, draft(&[("bolt", 7)]))
            .unwrap();
        assert_eq!(quantity(&scope, "bolt"), 3);

        let err = engine
            .update_maintenance(&mut scope, &created.record.id, draft(&[("bolt", 2), ("nut", 1)]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientStock { ref stock_id, .. } if stock_id == "nut"));

        assert_eq!(quantity(&scope, "bolt"), 3);
        assert_eq!(quantity(&scope, "nut"), 0);
        let stored = scope.find_maintenance(&created.record.id).unwrap().unwrap();
        assert_eq!(stored.used_stock, vec![UsedStockItem::new("bolt", 7)]);
    }

    #[test]
    fn test_update_unknown_id() {
        let store = setup(&[("bolt", 10)]);
        let mut scope = store.scope().unwrap();
        let err = StockLedgerEngine::new()
            .update_maintenance(&mut scope, "nope", draft(&[("bolt", 1)]))
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
        assert_eq!(quantity(&scope, "bolt"), 10);
    }

    #[test]
    fn test_delete_restores_and_tolerates_missing_stock() {
        let store = setup(&[("bolt", 10), ("nut", 5)]);
        let engine = StockLedgerEngine::new();
        let mut scope = store.scope().unwrap();

        let created = engine
            .create_maintenance(&mut scope, draft(&[("bolt", 7), ("nut", 2)]))
            .unwrap();
        assert!(scope.delete_stock("nut").unwrap());

        let outcome = engine
            .delete_maintenance(&mut scope, &created.record.id)
            .unwrap();
        assert_eq!(outcome.record.id, created.record.id);
        assert_eq!(outcome.deltas.len(), 1);
        assert_eq!(quantity(&scope, "bolt"), 10);
        assert!(scope.find_maintenance(&created.record.id).unwrap().is_none());

        let err = engine
            .delete_maintenance(&mut scope, &created.record.id)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }
}
