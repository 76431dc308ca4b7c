// ==========================================
// 设备维保管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;

use crate::api::{MachineApi, MaintenanceApi, OperatorApi, ReportApi, StockApi};
use crate::config::ConfigManager;
use crate::repository::memory_store::MemoryEntityStore;
use crate::repository::sqlite_store::SqliteEntityStore;
use crate::repository::store::EntityStore;

/// 应用状态
///
/// 所有 API 共享同一个实体存储，写入经由存储的作用域串行化
pub struct AppState<S = SqliteEntityStore> {
    /// 数据库路径（内存存储时为 ":memory:"）
    pub db_path: String,

    /// 实体存储
    pub store: Arc<S>,

    /// 运行期配置
    pub config: Arc<ConfigManager>,

    /// 机台API
    pub machine_api: Arc<MachineApi<S>>,

    /// 操作员API
    pub operator_api: Arc<OperatorApi<S>>,

    /// 备件API
    pub stock_api: Arc<StockApi<S>>,

    /// 维保记录API
    pub maintenance_api: Arc<MaintenanceApi<S>>,

    /// 报表与审计API
    pub report_api: Arc<ReportApi<S>>,
}

impl AppState<SqliteEntityStore> {
    /// 创建基于 SQLite 的应用状态
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let store = Arc::new(
            SqliteEntityStore::new(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?,
        );
        let config = Arc::new(
            ConfigManager::new(&db_path).map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        Ok(Self::with_store(db_path, store, config))
    }
}

impl AppState<MemoryEntityStore> {
    /// 创建基于内存存储的应用状态（进程退出即丢失）
    pub fn in_memory() -> Result<Self, String> {
        let config = Arc::new(
            ConfigManager::in_memory().map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        Ok(Self::with_store(
            ":memory:".to_string(),
            Arc::new(MemoryEntityStore::new()),
            config,
        ))
    }
}

impl<S: EntityStore> AppState<S> {
    /// 用已有存储与配置组装所有 API
    pub fn with_store(db_path: String, store: Arc<S>, config: Arc<ConfigManager>) -> Self {
        let machine_api = Arc::new(MachineApi::new(store.clone(), config.clone()));
        let operator_api = Arc::new(OperatorApi::new(store.clone()));
        let stock_api = Arc::new(StockApi::new(store.clone()));
        let maintenance_api = Arc::new(MaintenanceApi::new(store.clone()));
        let report_api = Arc::new(ReportApi::new(store.clone(), config.clone()));

        tracing::info!("AppState初始化完成");

        Self {
            db_path,
            store,
            config,
            machine_api,
            operator_api,
            stock_api,
            maintenance_api,
            report_api,
        }
    }
}
