// ==========================================
// 设备维保管理系统 - 备件库存领域模型
// ==========================================
// 红线: quantity 是唯一需要台账保护的共享可变状态
//       quantity = 实物数量 - 现存维保记录占用数量
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// StockItem - 库存备件
// ==========================================
// 对齐: stock_items 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: String,
    pub name: String,
    pub quantity: i64,    // 在库数量 (>= 0)
    pub unit: String,     // 计量单位
    pub value: f64,       // 单价
    pub location: String, // 库位
}

impl StockItem {
    /// 是否足够扣减
    pub fn can_reserve(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }

    /// 扣减缺口（不足时为正数）
    pub fn shortfall(&self, quantity: i64) -> i64 {
        (quantity - self.quantity).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortfall() {
        let item = StockItem {
            id: "s1".to_string(),
            name: "bolt".to_string(),
            quantity: 3,
            unit: "pcs".to_string(),
            value: 0.5,
            location: "A1".to_string(),
        };
        assert!(item.can_reserve(3));
        assert!(!item.can_reserve(5));
        assert_eq!(item.shortfall(5), 2);
        assert_eq!(item.shortfall(1), 0);
    }
}
