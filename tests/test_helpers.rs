// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use std::error::Error;
use tempfile::NamedTempFile;

use machine_mind::api::dto::{MaintenanceRequest, UsedStockRequest};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是合法UTF-8")?
        .to_string();

    let conn = machine_mind::db::open_sqlite_connection(&db_path)?;
    machine_mind::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 构造维保请求
pub fn maintenance_request(
    machine_id: &str,
    date: &str,
    used_stock: &[(&str, i64)],
) -> MaintenanceRequest {
    MaintenanceRequest {
        machine_id: machine_id.to_string(),
        date: date.to_string(),
        description: "测试维保".to_string(),
        status: None,
        used_stock: used_stock
            .iter()
            .map(|(stock_id, quantity)| UsedStockRequest {
                stock_id: stock_id.to_string(),
                quantity: *quantity,
            })
            .collect(),
    }
}
