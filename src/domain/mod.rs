// ==========================================
// 设备维保管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod machine;
pub mod maintenance;
pub mod operator;
pub mod report;
pub mod stock;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType, StockDelta};
pub use machine::{Machine, Sensor};
pub use maintenance::{Maintenance, MaintenanceDraft, UsedStockItem};
pub use operator::Operator;
pub use report::{MonthFilter, ScheduledMaintenanceRow, UsedStockReportRow};
pub use stock::StockItem;
pub use types::{EntityKind, MaintenanceStatus};
