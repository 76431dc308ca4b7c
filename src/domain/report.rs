// ==========================================
// 设备维保管理系统 - 报表领域模型
// ==========================================
// 职责: 备件消耗报表、已计划维保报表的行结构与月份过滤
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// 备件消耗报表行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedStockReportRow {
    pub item_name: String,
    pub quantity: i64,
    pub date: NaiveDate,
}

/// 已计划维保报表行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledMaintenanceRow {
    pub id: String,
    pub machine_name: String,
    pub date: NaiveDate,
    pub description: String,
}

// ==========================================
// MonthFilter - 报表月份过滤
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthFilter {
    pub year: i32,
    pub month: u32, // 1..=12
}

impl MonthFilter {
    /// 创建月份过滤；月份越界返回 None
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 日期是否落在该月
    pub fn matches(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_filter() {
        assert!(MonthFilter::new(2026, 0).is_none());
        assert!(MonthFilter::new(2026, 13).is_none());

        let filter = MonthFilter::new(2026, 3).unwrap();
        assert!(filter.matches(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()));
        assert!(!filter.matches(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
        assert!(!filter.matches(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
    }
}
