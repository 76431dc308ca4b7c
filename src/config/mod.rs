// ==========================================
// 设备维保管理系统 - 配置层
// ==========================================
// 职责: 进程启动配置 (环境变量) + 运行期业务配置 (config_kv 表)
// ==========================================

pub mod app_config;
pub mod config_manager;

// 重导出
pub use app_config::{get_default_db_path, AppConfig, LogFormat};
pub use config_manager::{config_keys, ConfigManager};
