// ==========================================
// 设备维保管理系统 - 维保记录数据仓储
// ==========================================
// 职责: maintenance / maintenance_stock 表的读写映射
// 红线: 占用明细按 position 保序，替换时整体删除后重写
// 红线: 不修改 stock_items（扣减/返还只由台账引擎发起）
// ==========================================

use crate::domain::maintenance::{Maintenance, UsedStockItem};
use crate::domain::types::MaintenanceStatus;
use crate::repository::error::RepositoryResult;
use crate::repository::sqlite_store::SqliteScope;
use crate::repository::store::MaintenanceStore;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::HashMap;

const MAINTENANCE_COLUMNS: &str = "id, machine_id, date, description, status";

fn map_maintenance_row(row: &Row) -> SqliteResult<Maintenance> {
    Ok(Maintenance {
        id: row.get(0)?,
        machine_id: row.get(1)?,
        date: row.get::<_, NaiveDate>(2)?,
        description: row.get(3)?,
        status: MaintenanceStatus::from_db_str(&row.get::<_, String>(4)?),
        used_stock: Vec::new(),
    })
}

fn write_used_stock(
    conn: &Connection,
    maintenance_id: &str,
    used_stock: &[UsedStockItem],
) -> SqliteResult<()> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO maintenance_stock (maintenance_id, position, stock_id, quantity)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )?;
    for (position, entry) in used_stock.iter().enumerate() {
        stmt.execute(params![
            maintenance_id,
            position as i64,
            entry.stock_id,
            entry.quantity
        ])?;
    }
    Ok(())
}

impl MaintenanceStore for SqliteScope<'_> {
    fn find_maintenance(&self, id: &str) -> RepositoryResult<Option<Maintenance>> {
        let sql = format!("SELECT {} FROM maintenance WHERE id = ?1", MAINTENANCE_COLUMNS);
        let record = self
            .conn()
            .query_row(&sql, params![id], map_maintenance_row)
            .optional()?;

        match record {
            Some(mut record) => {
                record.used_stock = self.list_used_stock(&record.id)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn list_maintenance(&self) -> RepositoryResult<Vec<Maintenance>> {
        let conn = self.conn();

        let mut usage_stmt = conn.prepare(
            r#"
            SELECT maintenance_id, stock_id, quantity
            FROM maintenance_stock
            ORDER BY maintenance_id, position
            "#,
        )?;
        let mut usage_by_record: HashMap<String, Vec<UsedStockItem>> = HashMap::new();
        let rows = usage_stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                UsedStockItem {
                    stock_id: row.get(1)?,
                    quantity: row.get(2)?,
                },
            ))
        })?;
        for row in rows {
            let (maintenance_id, entry) = row?;
            usage_by_record.entry(maintenance_id).or_default().push(entry);
        }

        let sql = format!("SELECT {} FROM maintenance ORDER BY rowid", MAINTENANCE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map([], map_maintenance_row)?
            .collect::<SqliteResult<Vec<_>>>()?
            .into_iter()
            .map(|mut record| {
                record.used_stock = usage_by_record.remove(&record.id).unwrap_or_default();
                record
            })
            .collect();

        Ok(records)
    }

    fn insert_maintenance(&mut self, record: &Maintenance) -> RepositoryResult<()> {
        let conn = self.conn();
        conn.execute(
            r#"
            INSERT INTO maintenance (id, machine_id, date, description, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.id,
                record.machine_id,
                record.date,
                record.description,
                record.status.to_db_str(),
            ],
        )?;
        write_used_stock(conn, &record.id, &record.used_stock)?;
        Ok(())
    }

    fn update_maintenance(&mut self, record: &Maintenance) -> RepositoryResult<bool> {
        let conn = self.conn();
        let rows = conn.execute(
            r#"
            UPDATE maintenance
            SET machine_id = ?2, date = ?3, description = ?4, status = ?5
            WHERE id = ?1
            "#,
            params![
                record.id,
                record.machine_id,
                record.date,
                record.description,
                record.status.to_db_str(),
            ],
        )?;
        if rows == 0 {
            return Ok(false);
        }

        conn.execute(
            "DELETE FROM maintenance_stock WHERE maintenance_id = ?1",
            params![record.id],
        )?;
        write_used_stock(conn, &record.id, &record.used_stock)?;
        Ok(true)
    }

    fn delete_maintenance(&mut self, id: &str) -> RepositoryResult<bool> {
        let conn = self.conn();
        conn.execute(
            "DELETE FROM maintenance_stock WHERE maintenance_id = ?1",
            params![id],
        )?;
        let rows = conn.execute("DELETE FROM maintenance WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_used_stock(&self, maintenance_id: &str) -> RepositoryResult<Vec<UsedStockItem>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT stock_id, quantity
            FROM maintenance_stock
            WHERE maintenance_id = ?1
            ORDER BY position
            "#,
        )?;
        let entries = stmt
            .query_map(params![maintenance_id], |row| {
                Ok(UsedStockItem {
                    stock_id: row.get(0)?,
                    quantity: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    fn count_maintenance_on(&self, machine_id: &str, date: NaiveDate) -> RepositoryResult<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM maintenance WHERE machine_id = ?1 AND date = ?2",
            params![machine_id, date],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
