// ==========================================
// 设备维保管理系统 - 启动配置
// ==========================================
// 职责: 从环境变量读取进程级配置（数据库路径、监听地址、日志格式）
// 说明: 运行期可调整的业务配置见 ConfigManager
// ==========================================

use std::path::PathBuf;

/// 环境变量名
pub mod env_keys {
    pub const DB_PATH: &str = "MACHINE_MIND_DB_PATH";
    pub const BIND_ADDR: &str = "MACHINE_MIND_BIND_ADDR";
    pub const LOG_FORMAT: &str = "MACHINE_MIND_LOG_FORMAT";
}

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// 未知值按 Pretty 处理
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// 进程启动配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// 从环境变量加载，缺省项取默认值
    pub fn from_env() -> Self {
        Self {
            db_path: get_default_db_path(),
            bind_addr: non_empty_env(env_keys::BIND_ADDR)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            log_format: non_empty_env(env_keys::LOG_FORMAT)
                .map(|v| LogFormat::from_str(&v))
                .unwrap_or_default(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 默认数据库路径
///
/// 优先级: MACHINE_MIND_DB_PATH > 用户数据目录 > ./machine_mind.db
pub fn get_default_db_path() -> String {
    if let Some(path) = non_empty_env(env_keys::DB_PATH) {
        return path;
    }

    let mut path = PathBuf::from("./machine_mind.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("machine-mind");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("machine_mind.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::from_str("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("xml"), LogFormat::Pretty);
    }
}
