// ==========================================
// 设备维保管理系统 - 实体存储契约
// ==========================================
// 职责: 定义实体存取接口与作用域事务
// 红线: 多步写入必须在同一个作用域内完成，作用域提交前外部不可见
// 红线: 作用域未提交即释放（含 panic 展开）时必须回滚
// ==========================================
//
// 使用方式:
//
//   let mut scope = store.scope()?;
//   let stock = scope.find_stock("bolt")?;
//   scope.set_stock_quantity("bolt", 3)?;
//   scope.commit()?;
//
// 同一时刻只有一个作用域存活，获取作用域即获得独占访问。

use crate::domain::action_log::ActionLog;
use crate::domain::machine::{Machine, Sensor};
use crate::domain::maintenance::{Maintenance, UsedStockItem};
use crate::domain::operator::Operator;
use crate::domain::stock::StockItem;
use crate::domain::types::EntityKind;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDate;

// ==========================================
// 各实体的存取接口
// ==========================================

/// 机台 + 传感器
pub trait MachineStore {
    /// 按 ID 查询机台（含传感器，按挂载顺序）
    fn find_machine(&self, id: &str) -> RepositoryResult<Option<Machine>>;

    /// 查询全部机台（含传感器）
    fn list_machines(&self) -> RepositoryResult<Vec<Machine>>;

    /// 新建机台，连同 `machine.sensors` 一起写入
    fn insert_machine(&mut self, machine: &Machine) -> RepositoryResult<()>;

    /// 更新机台基础字段，并用 `machine.sensors` 整体替换传感器列表
    ///
    /// 返回 false 表示机台不存在
    fn update_machine(&mut self, machine: &Machine) -> RepositoryResult<bool>;

    /// 删除机台及其传感器；返回 false 表示机台不存在
    fn delete_machine(&mut self, id: &str) -> RepositoryResult<bool>;

    /// 查询机台下的传感器
    fn list_sensors(&self, machine_id: &str) -> RepositoryResult<Vec<Sensor>>;

    /// 向机台追加一个传感器
    fn insert_sensor(&mut self, machine_id: &str, sensor: &Sensor) -> RepositoryResult<()>;

    /// 解除所有机台对该操作员的引用，返回受影响的机台数
    fn clear_operator(&mut self, operator_id: &str) -> RepositoryResult<usize>;
}

/// 操作员
pub trait OperatorStore {
    fn find_operator(&self, id: &str) -> RepositoryResult<Option<Operator>>;
    fn list_operators(&self) -> RepositoryResult<Vec<Operator>>;
    fn insert_operator(&mut self, operator: &Operator) -> RepositoryResult<()>;
    fn update_operator(&mut self, operator: &Operator) -> RepositoryResult<bool>;
    fn delete_operator(&mut self, id: &str) -> RepositoryResult<bool>;
}

/// 备件库存
pub trait StockStore {
    fn find_stock(&self, id: &str) -> RepositoryResult<Option<StockItem>>;
    fn list_stock(&self) -> RepositoryResult<Vec<StockItem>>;
    fn insert_stock(&mut self, item: &StockItem) -> RepositoryResult<()>;
    fn update_stock(&mut self, item: &StockItem) -> RepositoryResult<bool>;
    fn delete_stock(&mut self, id: &str) -> RepositoryResult<bool>;

    /// 直接写入在库数量（台账引擎专用）
    ///
    /// 返回 false 表示备件不存在
    fn set_stock_quantity(&mut self, id: &str, quantity: i64) -> RepositoryResult<bool>;
}

/// 维保记录 + 备件占用明细
pub trait MaintenanceStore {
    /// 按 ID 查询维保记录（含占用明细，按录入顺序）
    fn find_maintenance(&self, id: &str) -> RepositoryResult<Option<Maintenance>>;

    fn list_maintenance(&self) -> RepositoryResult<Vec<Maintenance>>;

    /// 新建维保记录，连同 `used_stock` 一起写入
    fn insert_maintenance(&mut self, record: &Maintenance) -> RepositoryResult<()>;

    /// 替换维保记录及其占用明细；返回 false 表示记录不存在
    fn update_maintenance(&mut self, record: &Maintenance) -> RepositoryResult<bool>;

    /// 删除维保记录及其占用明细；返回 false 表示记录不存在
    fn delete_maintenance(&mut self, id: &str) -> RepositoryResult<bool>;

    /// 按维保记录分组查询占用明细
    fn list_used_stock(&self, maintenance_id: &str) -> RepositoryResult<Vec<UsedStockItem>>;

    /// 某机台在某天的维保记录数（机台派生状态用）
    fn count_maintenance_on(&self, machine_id: &str, date: NaiveDate) -> RepositoryResult<usize>;
}

/// 操作日志
pub trait ActionLogStore {
    fn insert_action_log(&mut self, log: &ActionLog) -> RepositoryResult<()>;

    /// 最新的 `limit` 条日志，按时间倒序
    fn list_action_logs(&self, limit: usize) -> RepositoryResult<Vec<ActionLog>>;
}

// ==========================================
// EntityScope - 作用域事务
// ==========================================

/// 作用域: 一段独占访问
///
/// - `commit` 之前的写入对其他作用域不可见
/// - 未 `commit` 即释放时，所有写入被撤销
pub trait EntityScope:
    MachineStore + OperatorStore + StockStore + MaintenanceStore + ActionLogStore
{
    /// 引用校验用的存在性查询
    fn exists(&self, kind: EntityKind, id: &str) -> RepositoryResult<bool>;

    /// 提交作用域内的全部写入
    fn commit(self) -> RepositoryResult<()>
    where
        Self: Sized;
}

// ==========================================
// EntityStore - 实体存储
// ==========================================

/// 实体存储: 作用域的发放者
///
/// `scope()` 在另一个作用域存活期间阻塞等待
pub trait EntityStore: Send + Sync {
    type Scope<'a>: EntityScope
    where
        Self: 'a;

    /// 获取独占作用域
    fn scope(&self) -> RepositoryResult<Self::Scope<'_>>;
}
