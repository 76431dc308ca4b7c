// ==========================================
// 设备维保管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把仓储/引擎错误转换为带原因的业务错误
// 约定: 校验类错误 → 4xx，存储类错误 → 5xx
// ==========================================

use crate::domain::types::EntityKind;
use crate::engine::error::LedgerError;
use crate::repository::error::RepositoryError;
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求校验错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 请求中引用的外部实体不存在（区别于主资源 NotFound）
    #[error("无效引用: {kind}(id={id})不存在")]
    InvalidReference { kind: EntityKind, id: String },

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 备件台账错误
    // ==========================================
    #[error("备件不存在: stock_id={stock_id}")]
    UnknownStockItem { stock_id: String },

    #[error("库存不足: {name} (id={stock_id}) 需要 {requested}, 在库 {available}")]
    InsufficientStock {
        stock_id: String,
        name: String,
        requested: i64,
        available: i64,
    },

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定的错误代码（前端按此分支）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::InvalidReference { .. } => "INVALID_REFERENCE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::UnknownStockItem { .. } => "UNKNOWN_STOCK_ITEM",
            ApiError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::DatabaseTransactionError(_) => "DATABASE_TRANSACTION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    /// HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_)
            | ApiError::InvalidReference { .. }
            | ApiError::UnknownStockItem { .. }
            | ApiError::InsufficientStock { .. } => 400,
            ApiError::NotFound(_) => 404,
            ApiError::BusinessRuleViolation(_) => 409,
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => 500,
        }
    }

    /// 结构化详情（可选）
    pub fn details(&self) -> Option<JsonValue> {
        match self {
            ApiError::InvalidReference { kind, id } => Some(json!({
                "kind": kind,
                "id": id,
            })),
            ApiError::UnknownStockItem { stock_id } => Some(json!({ "stockId": stock_id })),
            ApiError::InsufficientStock {
                stock_id,
                name,
                requested,
                available,
            } => Some(json!({
                "stockId": stock_id,
                "name": name,
                "requested": requested,
                "available": available,
                "shortfall": requested - available,
            })),
            _ => None,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("检查约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 LedgerError 转换
// ==========================================
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidQuantity { stock_id, quantity } => ApiError::InvalidInput(format!(
                "备件{}的占用数量必须为正数，实际为{}",
                stock_id, quantity
            )),
            LedgerError::UnknownStockItem { stock_id } => ApiError::UnknownStockItem { stock_id },
            LedgerError::InsufficientStock {
                stock_id,
                name,
                requested,
                available,
            } => ApiError::InsufficientStock {
                stock_id,
                name,
                requested,
                available,
            },
            LedgerError::NotFound { id } => {
                ApiError::NotFound(format!("{}(id={})不存在", EntityKind::Maintenance, id))
            }
            err @ LedgerError::CompensationFailed { .. } => ApiError::InternalError(err.to_string()),
            LedgerError::Repository(e) => e.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
