// ==========================================
// 设备维保管理系统 - 操作日志领域模型
// ==========================================
// 红线: 维保写入必须留痕，且与台账变更同一作用域提交
// 用途: 审计追踪，备件扣减/返还明细回查
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
// 对齐: action_log 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLog {
    pub action_id: String,             // 日志ID
    pub action_type: ActionType,       // 操作类型
    pub action_ts: NaiveDateTime,      // 操作时间戳 (UTC)
    pub entity_id: String,             // 被操作的维保记录ID
    pub payload_json: Option<JsonValue>, // 操作负载 (占用明细 + 库存变化)
    pub detail: Option<String>,        // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateMaintenance, // 新建维保（扣减备件）
    UpdateMaintenance, // 修改维保（返还旧占用、扣减新占用）
    DeleteMaintenance, // 删除维保（返还占用）
}

// ==========================================
// StockDelta - 库存变化记录
// ==========================================
// delta < 0 表示扣减，> 0 表示返还
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDelta {
    pub stock_id: String,
    pub delta: i64,
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateMaintenance => "CreateMaintenance",
            ActionType::UpdateMaintenance => "UpdateMaintenance",
            ActionType::DeleteMaintenance => "DeleteMaintenance",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CreateMaintenance" => Some(ActionType::CreateMaintenance),
            "UpdateMaintenance" => Some(ActionType::UpdateMaintenance),
            "DeleteMaintenance" => Some(ActionType::DeleteMaintenance),
            _ => None,
        }
    }
}

impl ActionLog {
    /// 创建新的操作日志
    pub fn new(action_type: ActionType, entity_id: impl Into<String>) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type,
            action_ts: chrono::Utc::now().naive_utc(),
            entity_id: entity_id.into(),
            payload_json: None,
            detail: None,
        }
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    /// 设置描述
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
