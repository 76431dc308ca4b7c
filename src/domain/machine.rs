// ==========================================
// 设备维保管理系统 - 机台领域模型
// ==========================================
// 职责: 机台 (Machine) 与其附属传感器 (Sensor)
// 红线: 传感器无独立生命周期，随机台创建/替换/删除
// 红线: 机台对操作员是弱引用，操作员删除时只置空引用
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Sensor - 传感器
// ==========================================
// 对齐: sensors 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: String,   // 传感器ID (挂载时重新生成)
    pub name: String, // 名称
    #[serde(rename = "type")]
    pub sensor_type: String, // 类型标签: temperature / pressure / vibration ...
}

impl Sensor {
    /// 创建新传感器（生成新ID）
    pub fn new(name: impl Into<String>, sensor_type: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            sensor_type: sensor_type.into(),
        }
    }
}

// ==========================================
// Machine - 机台
// ==========================================
// 对齐: machines 表 + sensors 子表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    // ===== 主键 =====
    pub id: String,

    // ===== 基础信息 =====
    pub name: String,
    pub model: Option<String>,        // 型号
    pub manufacturer: Option<String>, // 制造商
    pub year: Option<i32>,            // 出厂年份

    // ===== 状态 =====
    // 存储值为自由文本；读取时可能被"维保中"覆盖（见 with_derived_status）
    pub status: String,

    // ===== 关联 =====
    pub operator_id: Option<String>, // 操作员弱引用
    pub sensors: Vec<Sensor>,        // 有序传感器列表
}

impl Machine {
    /// 读取时派生状态
    ///
    /// # 参数
    /// - `has_maintenance_today`: 当天是否存在引用该机台的维保记录
    /// - `label`: "维保中"状态显示文本（来自配置）
    ///
    /// # 说明
    /// 只影响返回值，不回写存储
    pub fn with_derived_status(mut self, has_maintenance_today: bool, label: &str) -> Self {
        if has_maintenance_today {
            self.status = label.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_machine() -> Machine {
        Machine {
            id: "m1".to_string(),
            name: "Lathe".to_string(),
            model: None,
            manufacturer: None,
            year: Some(2019),
            status: "active".to_string(),
            operator_id: None,
            sensors: vec![Sensor::new("spindle temp", "temperature")],
        }
    }

    #[test]
    fn test_derived_status_override() {
        let machine = sample_machine().with_derived_status(true, "under maintenance");
        assert_eq!(machine.status, "under maintenance");

        let machine = sample_machine().with_derived_status(false, "under maintenance");
        assert_eq!(machine.status, "active");
    }

    #[test]
    fn test_machine_json_uses_camel_case() {
        let mut machine = sample_machine();
        machine.operator_id = Some("op-1".to_string());
        let value = serde_json::to_value(&machine).unwrap();
        assert_eq!(value["operatorId"], "op-1");
        assert_eq!(value["sensors"][0]["type"], "temperature");
    }
}
