// ==========================================
// 设备维保管理系统 - 操作员领域模型
// ==========================================

use serde::{Deserialize, Serialize};

/// 操作员
///
/// 机台通过 `operator_id` 弱引用操作员；删除操作员只会把引用置空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: String,
    pub name: String,
}
