// ==========================================
// 设备维保管理系统 - 配置管理器
// ==========================================
// 职责: 运行期业务配置的读取与覆写
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 打开独立连接
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_config_table(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 注意: 若该连接同时被实体存储共享，不要在作用域存活期间读取配置
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            ensure_config_table(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 内存库（配合内存实体存储使用）
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        ensure_config_table(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    // ===== 业务配置 =====

    /// 机台"维保中"状态显示文本
    pub fn maintenance_status_label(&self) -> RepositoryResult<String> {
        self.get_config_or_default(
            config_keys::MACHINE_MAINTENANCE_STATUS_LABEL,
            defaults::MACHINE_MAINTENANCE_STATUS_LABEL,
        )
    }

    /// 操作日志查询默认条数；配置值非法时回退默认值
    pub fn action_log_default_limit(&self) -> RepositoryResult<usize> {
        let raw = self.get_config_value(config_keys::ACTION_LOG_DEFAULT_LIMIT)?;
        let limit = match raw {
            Some(v) => match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(value = %v, "action_log_default_limit 非法，使用默认值");
                    defaults::ACTION_LOG_DEFAULT_LIMIT
                }
            },
            None => defaults::ACTION_LOG_DEFAULT_LIMIT,
        };
        Ok(limit)
    }
}

fn ensure_config_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 机台派生状态
    pub const MACHINE_MAINTENANCE_STATUS_LABEL: &str = "machine_maintenance_status_label";

    // 审计
    pub const ACTION_LOG_DEFAULT_LIMIT: &str = "action_log_default_limit";
}

pub mod defaults {
    pub const MACHINE_MAINTENANCE_STATUS_LABEL: &str = "under maintenance";
    pub const ACTION_LOG_DEFAULT_LIMIT: usize = 100;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let config = ConfigManager::in_memory().unwrap();
        assert_eq!(config.maintenance_status_label().unwrap(), "under maintenance");
        assert_eq!(config.action_log_default_limit().unwrap(), 100);
    }

    #[test]
    fn test_set_and_override() {
        let config = ConfigManager::in_memory().unwrap();
        config
            .set_config_value(config_keys::MACHINE_MAINTENANCE_STATUS_LABEL, "em manutenção")
            .unwrap();
        config
            .set_config_value(config_keys::MACHINE_MAINTENANCE_STATUS_LABEL, "maintenance")
            .unwrap();
        assert_eq!(config.maintenance_status_label().unwrap(), "maintenance");
    }

    #[test]
    fn test_invalid_limit_falls_back() {
        let config = ConfigManager::in_memory().unwrap();
        config
            .set_config_value(config_keys::ACTION_LOG_DEFAULT_LIMIT, "abc")
            .unwrap();
        assert_eq!(config.action_log_default_limit().unwrap(), 100);

        config
            .set_config_value(config_keys::ACTION_LOG_DEFAULT_LIMIT, "20")
            .unwrap();
        assert_eq!(config.action_log_default_limit().unwrap(), 20);
    }
}
