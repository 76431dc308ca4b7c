// ==========================================
// 设备维保管理系统 - 报表引擎
// ==========================================
// 职责: 备件消耗报表、已计划维保报表
// 红线: Engine 不拼 SQL，只依赖存储契约
// 红线: 引用已被删除的备件/机台的行不出现在报表中
// ==========================================

use crate::domain::report::{MonthFilter, ScheduledMaintenanceRow, UsedStockReportRow};
use crate::domain::types::MaintenanceStatus;
use crate::repository::error::RepositoryResult;
use crate::repository::store::{MachineStore, MaintenanceStore, StockStore};
use std::collections::HashMap;

pub struct ReportEngine {}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 备件消耗报表
    ///
    /// 每条占用明细一行，按维保日期倒序
    pub fn used_stock_report<S>(
        &self,
        store: &S,
        filter: Option<MonthFilter>,
    ) -> RepositoryResult<Vec<UsedStockReportRow>>
    where
        S: StockStore + MaintenanceStore + ?Sized,
    {
        let names: HashMap<String, String> = store
            .list_stock()?
            .into_iter()
            .map(|item| (item.id, item.name))
            .collect();

        let mut rows: Vec<UsedStockReportRow> = store
            .list_maintenance()?
            .into_iter()
            .filter(|record| filter.map_or(true, |f| f.matches(record.date)))
            .flat_map(|record| {
                let date = record.date;
                record
                    .used_stock
                    .into_iter()
                    .filter_map(|entry| {
                        names.get(&entry.stock_id).map(|name| UsedStockReportRow {
                            item_name: name.clone(),
                            quantity: entry.quantity,
                            date,
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    /// 已计划维保报表
    ///
    /// 只含 Scheduled 状态，附机台名称，按日期正序
    pub fn scheduled_maintenance_report<S>(
        &self,
        store: &S,
        filter: Option<MonthFilter>,
    ) -> RepositoryResult<Vec<ScheduledMaintenanceRow>>
    where
        S: MachineStore + MaintenanceStore + ?Sized,
    {
        let machine_names: HashMap<String, String> = store
            .list_machines()?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();

        let mut rows: Vec<ScheduledMaintenanceRow> = store
            .list_maintenance()?
            .into_iter()
            .filter(|record| record.status == MaintenanceStatus::Scheduled)
            .filter(|record| filter.map_or(true, |f| f.matches(record.date)))
            .filter_map(|record| {
                machine_names
                    .get(&record.machine_id)
                    .map(|machine_name| ScheduledMaintenanceRow {
                        id: record.id,
                        machine_name: machine_name.clone(),
                        date: record.date,
                        description: record.description,
                    })
            })
            .collect();

        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::Machine;
    use crate::domain::maintenance::{Maintenance, UsedStockItem};
    use crate::domain::stock::StockItem;
    use crate::repository::memory_store::MemoryEntityStore;
    use crate::repository::store::EntityStore;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, machine_id: &str, date: NaiveDate, status: MaintenanceStatus) -> Maintenance {
        Maintenance {
            id: id.to_string(),
            machine_id: machine_id.to_string(),
            date,
            description: format!("work {}", id),
            status,
            used_stock: vec![UsedStockItem::new("bolt", 2), UsedStockItem::new("gone", 1)],
        }
    }

    #[test]
    fn test_reports() {
        let store = MemoryEntityStore::new();
        let mut scope = store.scope().unwrap();
        scope
            .insert_stock(&StockItem {
                id: "bolt".to_string(),
                name: "Bolt M8".to_string(),
                quantity: 10,
                unit: "pcs".to_string(),
                value: 0.2,
                location: "A1".to_string(),
            })
            .unwrap();
        scope
            .insert_machine(&Machine {
                id: "m1".to_string(),
                name: "Lathe".to_string(),
                model: None,
                manufacturer: None,
                year: None,
                status: "active".to_string(),
                operator_id: None,
                sensors: vec![],
            })
            .unwrap();
        scope
            .insert_maintenance(&record("a", "m1", date(2026, 3, 5), MaintenanceStatus::Scheduled))
            .unwrap();
        scope
            .insert_maintenance(&record("b", "m1", date(2026, 4, 1), MaintenanceStatus::Completed))
            .unwrap();
        scope
            .insert_maintenance(&record("c", "m1", date(2026, 3, 1), MaintenanceStatus::Scheduled))
            .unwrap();
        scope
            .insert_maintenance(&record("d", "m-gone", date(2026, 3, 2), MaintenanceStatus::Scheduled))
            .unwrap();

        let engine = ReportEngine::new();

        let used = engine.used_stock_report(&scope, None).unwrap();
        assert_eq!(used.len(), 4, "缺失备件的明细不应出现");
        assert_eq!(used[0].date, date(2026, 4, 1));
        assert!(used.iter().all(|r| r.item_name == "Bolt M8"));

        let march = engine
            .used_stock_report(&scope, MonthFilter::new(2026, 3))
            .unwrap();
        assert_eq!(march.len(), 3);

        let scheduled = engine.scheduled_maintenance_report(&scope, None).unwrap();
        let ids: Vec<&str> = scheduled.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert_eq!(scheduled[0].machine_name, "Lathe");

        let april = engine
            .scheduled_maintenance_report(&scope, MonthFilter::new(2026, 4))
            .unwrap();
        assert!(april.is_empty());
    }
}
