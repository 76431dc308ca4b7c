// ==========================================
// 设备维保管理系统 - 请求 DTO
// ==========================================
// 职责: 显式请求结构 + 校验构造，非法载荷不进入台账引擎
// 红线: 占用数量必须为正；同一备件不得在一条维保记录中出现两次
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::machine::{Machine, Sensor};
use crate::domain::maintenance::{MaintenanceDraft, UsedStockItem};
use crate::domain::operator::Operator;
use crate::domain::report::MonthFilter;
use crate::domain::stock::StockItem;
use crate::domain::types::MaintenanceStatus;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;

fn require_non_empty(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    Ok(trimmed.to_string())
}

/// 解析日期字符串
pub fn parse_date(date_str: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|e| ApiError::InvalidInput(format!("日期格式错误（应为YYYY-MM-DD）: {}", e)))
}

// ==========================================
// 维保
// ==========================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedStockRequest {
    pub stock_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub machine_id: String,
    pub date: String,
    #[serde(default)]
    pub description: String,
    /// 新建时忽略；修改时缺省表示保留原状态
    #[serde(default)]
    pub status: Option<MaintenanceStatus>,
    #[serde(default)]
    pub used_stock: Vec<UsedStockRequest>,
}

impl UsedStockRequest {
    fn validate(self) -> ApiResult<UsedStockItem> {
        let stock_id = require_non_empty("stockId", &self.stock_id)?;
        if self.quantity <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "备件{}的占用数量必须为正数，实际为{}",
                stock_id, self.quantity
            )));
        }
        Ok(UsedStockItem::new(stock_id, self.quantity))
    }
}

impl MaintenanceRequest {
    /// 校验并转换为引擎草稿
    pub fn into_draft(self) -> ApiResult<MaintenanceDraft> {
        let machine_id = require_non_empty("machineId", &self.machine_id)?;
        let date = parse_date(&self.date)?;

        let mut seen = HashSet::new();
        let mut used_stock = Vec::with_capacity(self.used_stock.len());
        for entry in self.used_stock {
            let entry = entry.validate()?;
            if !seen.insert(entry.stock_id.clone()) {
                return Err(ApiError::InvalidInput(format!(
                    "备件{}在占用明细中重复出现",
                    entry.stock_id
                )));
            }
            used_stock.push(entry);
        }

        Ok(MaintenanceDraft {
            machine_id,
            date,
            description: self.description,
            status: self.status,
            used_stock,
        })
    }
}

// ==========================================
// 机台 / 传感器
// ==========================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
}

impl SensorRequest {
    /// 挂载时生成新 ID
    pub fn into_sensor(self) -> ApiResult<Sensor> {
        let name = require_non_empty("传感器名称", &self.name)?;
        Ok(Sensor::new(name, self.sensor_type.trim()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRequest {
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub operator_id: Option<String>,
    #[serde(default)]
    pub sensors: Vec<SensorRequest>,
}

impl MachineRequest {
    /// 校验并转换为机台；传感器全部重新生成 ID
    pub fn into_machine(self, id: String) -> ApiResult<Machine> {
        let name = require_non_empty("机台名称", &self.name)?;
        let operator_id = self
            .operator_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let sensors = self
            .sensors
            .into_iter()
            .map(SensorRequest::into_sensor)
            .collect::<ApiResult<Vec<_>>>()?;

        Ok(Machine {
            id,
            name,
            model: self.model,
            manufacturer: self.manufacturer,
            year: self.year,
            status: self.status.trim().to_string(),
            operator_id,
            sensors,
        })
    }
}

// ==========================================
// 操作员
// ==========================================

#[derive(Debug, Clone, Deserialize)]
pub struct OperatorRequest {
    pub name: String,
}

impl OperatorRequest {
    pub fn into_operator(self, id: String) -> ApiResult<Operator> {
        Ok(Operator {
            id,
            name: require_non_empty("操作员名称", &self.name)?,
        })
    }
}

// ==========================================
// 备件
// ==========================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub location: String,
}

impl StockRequest {
    pub fn into_stock_item(self, id: String) -> ApiResult<StockItem> {
        let name = require_non_empty("备件名称", &self.name)?;
        if self.quantity < 0 {
            return Err(ApiError::InvalidInput(format!(
                "在库数量不能为负: {}",
                self.quantity
            )));
        }
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(ApiError::InvalidInput(format!("单价非法: {}", self.value)));
        }
        Ok(StockItem {
            id,
            name,
            quantity: self.quantity,
            unit: self.unit.trim().to_string(),
            value: self.value,
            location: self.location.trim().to_string(),
        })
    }
}

// ==========================================
// 查询参数
// ==========================================

/// 报表查询: month 与 year 同时给出才过滤
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl ReportQuery {
    pub fn filter(&self) -> ApiResult<Option<MonthFilter>> {
        match (self.year, self.month) {
            (Some(year), Some(month)) => MonthFilter::new(year, month)
                .map(Some)
                .ok_or_else(|| ApiError::InvalidInput(format!("月份越界: {}", month))),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionLogQuery {
    pub limit: Option<usize>,
}
