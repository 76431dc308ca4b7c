// ==========================================
// 设备维保管理系统 - 台账引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 任何错误返回前，引擎已撤销本次调用的全部库存变化
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    // ===== 业务规则错误 =====
    #[error("占用数量必须为正数: stock_id={stock_id}, quantity={quantity}")]
    InvalidQuantity { stock_id: String, quantity: i64 },

    #[error("备件不存在: stock_id={stock_id}")]
    UnknownStockItem { stock_id: String },

    #[error("库存不足: {name} (id={stock_id}) 需要 {requested}, 在库 {available}")]
    InsufficientStock {
        stock_id: String,
        name: String,
        requested: i64,
        available: i64,
    },

    #[error("维保记录未找到: id={id}")]
    NotFound { id: String },

    // ===== 补偿失败 =====
    // 原始错误之后，撤销动作本身又失败；此时作用域不得提交
    #[error("补偿失败: {message} (原始错误: {original})")]
    CompensationFailed { original: String, message: String },

    // ===== 存储错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LedgerError {
    /// 库存缺口（仅 InsufficientStock）
    pub fn shortfall(&self) -> Option<i64> {
        match self {
            LedgerError::InsufficientStock {
                requested,
                available,
                ..
            } => Some(requested - available),
            _ => None,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
