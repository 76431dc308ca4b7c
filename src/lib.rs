// ==========================================
// 设备维保管理系统 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 机台/传感器/操作员/备件与维保台账
// 红线: 维保记录的备件用量与库存同进同退
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 备件台账与报表
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装与 HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntityKind, MaintenanceStatus};

// 领域实体
pub use domain::{
    ActionLog, ActionType, Machine, Maintenance, Operator, Sensor, StockDelta, StockItem,
    UsedStockItem,
};

// 引擎
pub use engine::{ReportEngine, StockLedgerEngine};

// API
pub use api::{MachineApi, MaintenanceApi, OperatorApi, ReportApi, StockApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设备维保管理系统";
