// ==========================================
// 设备维保管理系统 - 引擎层
// ==========================================
// 职责: 备件台账规则与报表计算,不拼 SQL
// 红线: Engine 只依赖存储契约，作用域由调用方持有
// ==========================================

pub mod compensation;
pub mod error;
pub mod report;
pub mod stock_ledger;

// 重导出核心引擎
pub use compensation::{CompensationAction, CompensationLog};
pub use error::{LedgerError, LedgerResult};
pub use report::ReportEngine;
pub use stock_ledger::{LedgerOutcome, StockLedgerEngine};
