// ==========================================
// 设备维保管理系统 - 应用层
// ==========================================
// 职责: 组装存储/配置/API，并通过 HTTP 对外提供
// ==========================================

pub mod state;

#[cfg(feature = "http-server")]
pub mod http_routes;

// 重导出
pub use state::AppState;

#[cfg(feature = "http-server")]
pub use http_routes::router;
