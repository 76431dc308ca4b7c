// ==========================================
// 设备维保管理系统 - 维保领域模型
// ==========================================
// 职责: 维保记录 (Maintenance) 与备件占用明细 (UsedStockItem)
// 红线: 占用明细归属维保记录，无独立生命周期
// 红线: 明细顺序即扣减顺序，也决定回滚重放顺序
// ==========================================

use crate::domain::types::MaintenanceStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// UsedStockItem - 备件占用明细
// ==========================================
// 对齐: maintenance_stock 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedStockItem {
    pub stock_id: String, // 备件ID (弱引用，备件可被单独删除)
    pub quantity: i64,    // 占用数量 (> 0)
}

impl UsedStockItem {
    pub fn new(stock_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            stock_id: stock_id.into(),
            quantity,
        }
    }
}

// ==========================================
// Maintenance - 维保记录
// ==========================================
// 对齐: maintenance 表 + maintenance_stock 子表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    pub id: String,
    pub machine_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub status: MaintenanceStatus,
    pub used_stock: Vec<UsedStockItem>,
}

impl Maintenance {
    /// 某备件在本记录中的占用总量
    pub fn reserved_quantity(&self, stock_id: &str) -> i64 {
        self.used_stock
            .iter()
            .filter(|u| u.stock_id == stock_id)
            .map(|u| u.quantity)
            .sum()
    }
}

// ==========================================
// MaintenanceDraft - 维保写入草稿
// ==========================================
// 用途: API 层校验后的请求，交给台账引擎落库
// - 创建时 status 固定为 Scheduled
// - 更新时 status 为 None 表示保留原状态
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceDraft {
    pub machine_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub status: Option<MaintenanceStatus>,
    pub used_stock: Vec<UsedStockItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_quantity() {
        let record = Maintenance {
            id: "mt1".to_string(),
            machine_id: "m1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            description: "oil change".to_string(),
            status: MaintenanceStatus::Scheduled,
            used_stock: vec![UsedStockItem::new("bolt", 7), UsedStockItem::new("nut", 2)],
        };
        assert_eq!(record.reserved_quantity("bolt"), 7);
        assert_eq!(record.reserved_quantity("washer"), 0);
    }

    #[test]
    fn test_maintenance_json_shape() {
        let record = Maintenance {
            id: "mt1".to_string(),
            machine_id: "m1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            description: "oil change".to_string(),
            status: MaintenanceStatus::Scheduled,
            used_stock: vec![UsedStockItem::new("bolt", 7)],
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["machineId"], "m1");
        assert_eq!(value["date"], "2026-03-01");
        assert_eq!(value["status"], "scheduled");
        assert_eq!(value["usedStock"][0]["stockId"], "bolt");
        assert_eq!(value["usedStock"][0]["quantity"], 7);
    }
}
