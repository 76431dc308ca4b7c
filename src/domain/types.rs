// ==========================================
// 设备维保管理系统 - 领域类型定义
// ==========================================
// 职责: 实体种类、维保状态等跨实体共享的枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 实体种类 (Entity Kind)
// ==========================================
// 用途: 引用校验、NotFound 错误信息、操作日志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Machine,
    Sensor,
    Operator,
    StockItem,
    Maintenance,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Machine => write!(f, "Machine"),
            EntityKind::Sensor => write!(f, "Sensor"),
            EntityKind::Operator => write!(f, "Operator"),
            EntityKind::StockItem => write!(f, "StockItem"),
            EntityKind::Maintenance => write!(f, "Maintenance"),
        }
    }
}

// ==========================================
// 维保状态 (Maintenance Status)
// ==========================================
// 序列化格式: snake_case (与数据库、前端一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    #[default]
    Scheduled,  // 已计划
    InProgress, // 进行中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

impl MaintenanceStatus {
    /// 数据库存储值
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Scheduled => "scheduled",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::Cancelled => "cancelled",
        }
    }

    /// 从数据库值解析；未知值按 Scheduled 处理
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_progress" => MaintenanceStatus::InProgress,
            "completed" => MaintenanceStatus::Completed,
            "cancelled" => MaintenanceStatus::Cancelled,
            _ => MaintenanceStatus::Scheduled,
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
