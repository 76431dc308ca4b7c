// ==========================================
// 设备维保管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供实体存取接口与作用域事务,屏蔽存储细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod memory_store;
pub mod sqlite_store;
pub mod store;

mod action_log_repo;
mod machine_repo;
mod maintenance_repo;
mod operator_repo;
mod stock_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use memory_store::{MemoryEntityStore, MemoryScope};
pub use sqlite_store::{SqliteEntityStore, SqliteScope};
pub use store::{
    ActionLogStore, EntityScope, EntityStore, MachineStore, MaintenanceStore, OperatorStore,
    StockStore,
};
