// ==========================================
// 设备维保管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 HTTP 路由调用
// 约定: 所有 API 对实体存储泛型，SQLite 与内存存储共用
// ==========================================

pub mod dto;
pub mod error;
pub mod machine_api;
pub mod maintenance_api;
pub mod operator_api;
pub mod report_api;
pub mod stock_api;
pub mod validator;

// 重导出核心类型
pub use dto::{
    ActionLogQuery, MachineRequest, MaintenanceRequest, OperatorRequest, ReportQuery,
    SensorRequest, StockRequest, UsedStockRequest,
};
pub use error::{ApiError, ApiResult};
pub use machine_api::MachineApi;
pub use maintenance_api::MaintenanceApi;
pub use operator_api::OperatorApi;
pub use report_api::ReportApi;
pub use stock_api::StockApi;
pub use validator::ReferenceValidator;
