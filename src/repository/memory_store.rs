// ==========================================
// 设备维保管理系统 - 内存实体存储
// ==========================================
// 职责: 以内存表实现同一套存储契约（单元测试、嵌入式使用）
// 红线: 作用域开启时做快照，未提交即释放则整体恢复
// ==========================================

use crate::domain::action_log::ActionLog;
use crate::domain::machine::{Machine, Sensor};
use crate::domain::maintenance::{Maintenance, UsedStockItem};
use crate::domain::operator::Operator;
use crate::domain::stock::StockItem;
use crate::domain::types::EntityKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::store::{
    ActionLogStore, EntityScope, EntityStore, MachineStore, MaintenanceStore, OperatorStore,
    StockStore,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

// ==========================================
// Table - 保留插入顺序的键值表
// ==========================================
#[derive(Debug, Clone)]
struct Table<T> {
    rows: HashMap<String, T>,
    order: Vec<String>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    fn get(&self, id: &str) -> Option<&T> {
        self.rows.get(id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.rows.get_mut(id)
    }

    fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    /// 插入新行；主键重复返回错误
    fn insert(&mut self, entity: &'static str, id: &str, row: T) -> RepositoryResult<()> {
        if self.rows.contains_key(id) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "{}.id={}",
                entity, id
            )));
        }
        self.rows.insert(id.to_string(), row);
        self.order.push(id.to_string());
        Ok(())
    }

    /// 覆盖已有行；返回 false 表示不存在
    fn replace(&mut self, id: &str, row: T) -> bool {
        match self.rows.get_mut(id) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: &str) -> Option<T> {
        let removed = self.rows.remove(id)?;
        self.order.retain(|k| k != id);
        Some(removed)
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }
}

// ==========================================
// MemoryTables - 全部内存表
// ==========================================
// 子表按父 ID 分组: 传感器按机台，占用明细按维保记录
#[derive(Debug, Clone, Default)]
struct MemoryTables {
    machines: Table<Machine>,
    sensors: HashMap<String, Vec<Sensor>>,
    operators: Table<Operator>,
    stock: Table<StockItem>,
    maintenance: Table<Maintenance>,
    used_stock: HashMap<String, Vec<UsedStockItem>>,
    action_logs: Vec<ActionLog>,
}

impl MemoryTables {
    fn assemble_machine(&self, machine: &Machine) -> Machine {
        let mut machine = machine.clone();
        machine.sensors = self.sensors.get(&machine.id).cloned().unwrap_or_default();
        machine
    }

    fn assemble_maintenance(&self, record: &Maintenance) -> Maintenance {
        let mut record = record.clone();
        record.used_stock = self.used_stock.get(&record.id).cloned().unwrap_or_default();
        record
    }

    fn sensor_exists(&self, id: &str) -> bool {
        self.sensors
            .values()
            .any(|sensors| sensors.iter().any(|s| s.id == id))
    }
}

/// 主表只保存基础字段，子集合单独分组存放
fn strip_sensors(machine: &Machine) -> Machine {
    Machine {
        sensors: Vec::new(),
        ..machine.clone()
    }
}

fn strip_used_stock(record: &Maintenance) -> Maintenance {
    Maintenance {
        used_stock: Vec::new(),
        ..record.clone()
    }
}

// ==========================================
// MemoryEntityStore
// ==========================================
#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    tables: Mutex<MemoryTables>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntityStore for MemoryEntityStore {
    type Scope<'a> = MemoryScope<'a>;

    fn scope(&self) -> RepositoryResult<MemoryScope<'_>> {
        // 锁被污染时，持锁方的作用域已在 Drop 中恢复快照
        let tables = self.tables.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("内存存储锁被污染，接管继续使用");
            poisoned.into_inner()
        });
        let snapshot = tables.clone();
        Ok(MemoryScope {
            tables,
            snapshot: Some(snapshot),
        })
    }
}

// ==========================================
// MemoryScope
// ==========================================
pub struct MemoryScope<'a> {
    tables: MutexGuard<'a, MemoryTables>,
    snapshot: Option<MemoryTables>,
}

impl Drop for MemoryScope<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.tables = snapshot;
        }
    }
}

impl EntityScope for MemoryScope<'_> {
    fn exists(&self, kind: EntityKind, id: &str) -> RepositoryResult<bool> {
        let t = &self.tables;
        Ok(match kind {
            EntityKind::Machine => t.machines.contains(id),
            EntityKind::Sensor => t.sensor_exists(id),
            EntityKind::Operator => t.operators.contains(id),
            EntityKind::StockItem => t.stock.contains(id),
            EntityKind::Maintenance => t.maintenance.contains(id),
        })
    }

    fn commit(mut self) -> RepositoryResult<()> {
        self.snapshot = None;
        Ok(())
    }
}

impl MachineStore for MemoryScope<'_> {
    fn find_machine(&self, id: &str) -> RepositoryResult<Option<Machine>> {
        Ok(self
            .tables
            .machines
            .get(id)
            .map(|m| self.tables.assemble_machine(m)))
    }

    fn list_machines(&self) -> RepositoryResult<Vec<Machine>> {
        Ok(self
            .tables
            .machines
            .values()
            .map(|m| self.tables.assemble_machine(m))
            .collect())
    }

    fn insert_machine(&mut self, machine: &Machine) -> RepositoryResult<()> {
        if machine
            .sensors
            .iter()
            .any(|s| self.tables.sensor_exists(&s.id))
        {
            return Err(RepositoryError::UniqueConstraintViolation(
                "sensors.id".to_string(),
            ));
        }
        self.tables
            .machines
            .insert("machines", &machine.id, strip_sensors(machine))?;
        self.tables
            .sensors
            .insert(machine.id.clone(), machine.sensors.clone());
        Ok(())
    }

    fn update_machine(&mut self, machine: &Machine) -> RepositoryResult<bool> {
        if !self
            .tables
            .machines
            .replace(&machine.id, strip_sensors(machine))
        {
            return Ok(false);
        }
        self.tables
            .sensors
            .insert(machine.id.clone(), machine.sensors.clone());
        Ok(true)
    }

    fn delete_machine(&mut self, id: &str) -> RepositoryResult<bool> {
        self.tables.sensors.remove(id);
        Ok(self.tables.machines.remove(id).is_some())
    }

    fn list_sensors(&self, machine_id: &str) -> RepositoryResult<Vec<Sensor>> {
        Ok(self
            .tables
            .sensors
            .get(machine_id)
            .cloned()
            .unwrap_or_default())
    }

    fn insert_sensor(&mut self, machine_id: &str, sensor: &Sensor) -> RepositoryResult<()> {
        if !self.tables.machines.contains(machine_id) {
            return Err(RepositoryError::ForeignKeyViolation(format!(
                "sensors.machine_id={}",
                machine_id
            )));
        }
        if self.tables.sensor_exists(&sensor.id) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "sensors.id={}",
                sensor.id
            )));
        }
        self.tables
            .sensors
            .entry(machine_id.to_string())
            .or_default()
            .push(sensor.clone());
        Ok(())
    }

    fn clear_operator(&mut self, operator_id: &str) -> RepositoryResult<usize> {
        let ids: Vec<String> = self
            .tables
            .machines
            .values()
            .filter(|m| m.operator_id.as_deref() == Some(operator_id))
            .map(|m| m.id.clone())
            .collect();
        for id in &ids {
            if let Some(machine) = self.tables.machines.get_mut(id) {
                machine.operator_id = None;
            }
        }
        Ok(ids.len())
    }
}

impl OperatorStore for MemoryScope<'_> {
    fn find_operator(&self, id: &str) -> RepositoryResult<Option<Operator>> {
        Ok(self.tables.operators.get(id).cloned())
    }

    fn list_operators(&self) -> RepositoryResult<Vec<Operator>> {
        Ok(self.tables.operators.values().cloned().collect())
    }

    fn insert_operator(&mut self, operator: &Operator) -> RepositoryResult<()> {
        self.tables
            .operators
            .insert("operators", &operator.id, operator.clone())
    }

    fn update_operator(&mut self, operator: &Operator) -> RepositoryResult<bool> {
        Ok(self.tables.operators.replace(&operator.id, operator.clone()))
    }

    fn delete_operator(&mut self, id: &str) -> RepositoryResult<bool> {
        Ok(self.tables.operators.remove(id).is_some())
    }
}

impl StockStore for MemoryScope<'_> {
    fn find_stock(&self, id: &str) -> RepositoryResult<Option<StockItem>> {
        Ok(self.tables.stock.get(id).cloned())
    }

    fn list_stock(&self) -> RepositoryResult<Vec<StockItem>> {
        Ok(self.tables.stock.values().cloned().collect())
    }

    fn insert_stock(&mut self, item: &StockItem) -> RepositoryResult<()> {
        check_quantity(item.quantity)?;
        self.tables.stock.insert("stock_items", &item.id, item.clone())
    }

    fn update_stock(&mut self, item: &StockItem) -> RepositoryResult<bool> {
        check_quantity(item.quantity)?;
        Ok(self.tables.stock.replace(&item.id, item.clone()))
    }

    fn delete_stock(&mut self, id: &str) -> RepositoryResult<bool> {
        Ok(self.tables.stock.remove(id).is_some())
    }

    fn set_stock_quantity(&mut self, id: &str, quantity: i64) -> RepositoryResult<bool> {
        check_quantity(quantity)?;
        match self.tables.stock.get_mut(id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// 与 SQLite 的 CHECK (quantity >= 0) 对齐
fn check_quantity(quantity: i64) -> RepositoryResult<()> {
    if quantity < 0 {
        return Err(RepositoryError::CheckConstraintViolation(format!(
            "stock_items.quantity={}",
            quantity
        )));
    }
    Ok(())
}

impl MaintenanceStore for MemoryScope<'_> {
    fn find_maintenance(&self, id: &str) -> RepositoryResult<Option<Maintenance>> {
        Ok(self
            .tables
            .maintenance
            .get(id)
            .map(|r| self.tables.assemble_maintenance(r)))
    }

    fn list_maintenance(&self) -> RepositoryResult<Vec<Maintenance>> {
        Ok(self
            .tables
            .maintenance
            .values()
            .map(|r| self.tables.assemble_maintenance(r))
            .collect())
    }

    fn insert_maintenance(&mut self, record: &Maintenance) -> RepositoryResult<()> {
        self.tables
            .maintenance
            .insert("maintenance", &record.id, strip_used_stock(record))?;
        self.tables
            .used_stock
            .insert(record.id.clone(), record.used_stock.clone());
        Ok(())
    }

    fn update_maintenance(&mut self, record: &Maintenance) -> RepositoryResult<bool> {
        if !self
            .tables
            .maintenance
            .replace(&record.id, strip_used_stock(record))
        {
            return Ok(false);
        }
        self.tables
            .used_stock
            .insert(record.id.clone(), record.used_stock.clone());
        Ok(true)
    }

    fn delete_maintenance(&mut self, id: &str) -> RepositoryResult<bool> {
        self.tables.used_stock.remove(id);
        Ok(self.tables.maintenance.remove(id).is_some())
    }

    fn list_used_stock(&self, maintenance_id: &str) -> RepositoryResult<Vec<UsedStockItem>> {
        Ok(self
            .tables
            .used_stock
            .get(maintenance_id)
            .cloned()
            .unwrap_or_default())
    }

    fn count_maintenance_on(&self, machine_id: &str, date: NaiveDate) -> RepositoryResult<usize> {
        Ok(self
            .tables
            .maintenance
            .values()
            .filter(|r| r.machine_id == machine_id && r.date == date)
            .count())
    }
}

impl ActionLogStore for MemoryScope<'_> {
    fn insert_action_log(&mut self, log: &ActionLog) -> RepositoryResult<()> {
        self.tables.action_logs.push(log.clone());
        Ok(())
    }

    fn list_action_logs(&self, limit: usize) -> RepositoryResult<Vec<ActionLog>> {
        let mut logs = self.tables.action_logs.clone();
        // 稳定排序: 同一时间戳保持后写入在前
        logs.reverse();
        logs.sort_by(|a, b| b.action_ts.cmp(&a.action_ts));
        logs.truncate(limit);
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(id: &str, quantity: i64) -> StockItem {
        StockItem {
            id: id.to_string(),
            name: id.to_string(),
            quantity,
            unit: "pcs".to_string(),
            value: 1.0,
            location: "A1".to_string(),
        }
    }

    #[test]
    fn test_scope_rollback_on_drop() {
        let store = MemoryEntityStore::new();
        {
            let mut scope = store.scope().unwrap();
            scope.insert_stock(&stock("bolt", 10)).unwrap();
        }
        let scope = store.scope().unwrap();
        assert!(!scope.exists(EntityKind::StockItem, "bolt").unwrap());
    }

    #[test]
    fn test_scope_commit() {
        let store = MemoryEntityStore::new();
        let mut scope = store.scope().unwrap();
        scope.insert_stock(&stock("bolt", 10)).unwrap();
        scope.commit().unwrap();

        let mut scope = store.scope().unwrap();
        assert!(scope.set_stock_quantity("bolt", 3).unwrap());
        assert!(!scope.set_stock_quantity("nut", 3).unwrap());
        scope.commit().unwrap();

        let scope = store.scope().unwrap();
        assert_eq!(scope.find_stock("bolt").unwrap().unwrap().quantity, 3);
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let store = MemoryEntityStore::new();
        let mut scope = store.scope().unwrap();
        scope.insert_stock(&stock("bolt", 1)).unwrap();
        let err = scope.set_stock_quantity("bolt", -1).unwrap_err();
        assert!(matches!(err, RepositoryError::CheckConstraintViolation(_)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = MemoryEntityStore::new();
        let mut scope = store.scope().unwrap();
        scope.insert_stock(&stock("bolt", 1)).unwrap();
        let err = scope.insert_stock(&stock("bolt", 2)).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_sensors_grouped_by_machine() {
        let store = MemoryEntityStore::new();
        let mut scope = store.scope().unwrap();
        let machine = Machine {
            id: "m1".to_string(),
            name: "Lathe".to_string(),
            model: None,
            manufacturer: None,
            year: None,
            status: "active".to_string(),
            operator_id: Some("op1".to_string()),
            sensors: vec![Sensor::new("temp", "temperature")],
        };
        scope.insert_machine(&machine).unwrap();
        scope
            .insert_sensor("m1", &Sensor::new("vib", "vibration"))
            .unwrap();

        let sensors = scope.list_sensors("m1").unwrap();
        assert_eq!(sensors.len(), 2);
        assert_eq!(sensors[1].sensor_type, "vibration");

        assert_eq!(scope.clear_operator("op1").unwrap(), 1);
        assert_eq!(scope.find_machine("m1").unwrap().unwrap().operator_id, None);

        assert!(scope.delete_machine("m1").unwrap());
        assert!(scope.list_sensors("m1").unwrap().is_empty());
    }

    #[test]
    fn test_insert_order_preserved() {
        let store = MemoryEntityStore::new();
        let mut scope = store.scope().unwrap();
        for id in ["c", "a", "b"] {
            scope.insert_stock(&stock(id, 1)).unwrap();
        }
        let ids: Vec<String> = scope.list_stock().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
