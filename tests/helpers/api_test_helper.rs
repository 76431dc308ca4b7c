// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================
#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::error::Error;
use std::sync::Arc;
use tempfile::NamedTempFile;

use machine_mind::api::dto::{MachineRequest, OperatorRequest, StockRequest};
use machine_mind::api::{MachineApi, MaintenanceApi, OperatorApi, ReportApi, StockApi};
use machine_mind::config::ConfigManager;
use machine_mind::domain::{Machine, Operator, StockItem};
use machine_mind::repository::{EntityStore, SqliteEntityStore, StockStore};

pub use test_helpers::maintenance_request;

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 所有API共享同一个临时数据库
pub struct ApiTestEnv {
    pub db_path: String,
    pub store: Arc<SqliteEntityStore>,
    pub config: Arc<ConfigManager>,

    pub machine_api: Arc<MachineApi<SqliteEntityStore>>,
    pub operator_api: Arc<OperatorApi<SqliteEntityStore>>,
    pub stock_api: Arc<StockApi<SqliteEntityStore>>,
    pub maintenance_api: Arc<MaintenanceApi<SqliteEntityStore>>,
    pub report_api: Arc<ReportApi<SqliteEntityStore>>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的测试环境
    pub fn new() -> Result<Self, Box<dyn Error>> {
        machine_mind::logging::init_test();
        let (temp_file, db_path) = test_helpers::create_test_db()?;

        let store = Arc::new(SqliteEntityStore::new(&db_path)?);
        let config = Arc::new(ConfigManager::new(&db_path)?);

        Ok(Self {
            machine_api: Arc::new(MachineApi::new(store.clone(), config.clone())),
            operator_api: Arc::new(OperatorApi::new(store.clone())),
            stock_api: Arc::new(StockApi::new(store.clone())),
            maintenance_api: Arc::new(MaintenanceApi::new(store.clone())),
            report_api: Arc::new(ReportApi::new(store.clone(), config.clone())),
            db_path,
            store,
            config,
            _temp_file: temp_file,
        })
    }

    // ==========================================
    // 测试数据准备
    // ==========================================

    pub fn seed_operator(&self, name: &str) -> Operator {
        self.operator_api
            .create_operator(OperatorRequest {
                name: name.to_string(),
            })
            .expect("创建操作员失败")
    }

    pub fn seed_machine(&self, name: &str) -> Machine {
        self.machine_api
            .create_machine(machine_request(name, None))
            .expect("创建机台失败")
    }

    pub fn seed_stock(&self, name: &str, quantity: i64) -> StockItem {
        self.stock_api
            .create_stock(StockRequest {
                name: name.to_string(),
                quantity,
                unit: "pcs".to_string(),
                value: 1.5,
                location: "A-01".to_string(),
            })
            .expect("创建备件失败")
    }

    /// 直接读存储中的在库数量
    pub fn stock_quantity(&self, stock_id: &str) -> i64 {
        let scope = self.store.scope().expect("无法打开作用域");
        scope
            .find_stock(stock_id)
            .expect("查询备件失败")
            .map(|item| item.quantity)
            .expect("备件不存在")
    }
}

pub fn machine_request(name: &str, operator_id: Option<&str>) -> MachineRequest {
    MachineRequest {
        name: name.to_string(),
        model: Some("X-200".to_string()),
        manufacturer: Some("ACME".to_string()),
        year: Some(2020),
        status: "running".to_string(),
        operator_id: operator_id.map(str::to_string),
        sensors: Vec::new(),
    }
}
