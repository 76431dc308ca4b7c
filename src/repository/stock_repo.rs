// ==========================================
// 设备维保管理系统 - 备件库存数据仓储
// ==========================================
// 职责: stock_items 表的读写映射
// 红线: 数量校验由台账引擎负责；CHECK 约束兜底拒绝负库存
// ==========================================

use crate::domain::stock::StockItem;
use crate::repository::error::RepositoryResult;
use crate::repository::sqlite_store::SqliteScope;
use crate::repository::store::StockStore;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

const STOCK_COLUMNS: &str = "id, name, quantity, unit, value, location";

fn map_stock_row(row: &Row) -> SqliteResult<StockItem> {
    Ok(StockItem {
        id: row.get(0)?,
        name: row.get(1)?,
        quantity: row.get(2)?,
        unit: row.get(3)?,
        value: row.get(4)?,
        location: row.get(5)?,
    })
}

impl StockStore for SqliteScope<'_> {
    fn find_stock(&self, id: &str) -> RepositoryResult<Option<StockItem>> {
        let sql = format!("SELECT {} FROM stock_items WHERE id = ?1", STOCK_COLUMNS);
        let item = self
            .conn()
            .query_row(&sql, params![id], map_stock_row)
            .optional()?;
        Ok(item)
    }

    fn list_stock(&self) -> RepositoryResult<Vec<StockItem>> {
        let sql = format!("SELECT {} FROM stock_items ORDER BY rowid", STOCK_COLUMNS);
        let mut stmt = self.conn().prepare(&sql)?;
        let items = stmt
            .query_map([], map_stock_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(items)
    }

    fn insert_stock(&mut self, item: &StockItem) -> RepositoryResult<()> {
        self.conn().execute(
            r#"
            INSERT INTO stock_items (id, name, quantity, unit, value, location)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                item.id,
                item.name,
                item.quantity,
                item.unit,
                item.value,
                item.location
            ],
        )?;
        Ok(())
    }

    fn update_stock(&mut self, item: &StockItem) -> RepositoryResult<bool> {
        let rows = self.conn().execute(
            r#"
            UPDATE stock_items
            SET name = ?2, quantity = ?3, unit = ?4, value = ?5, location = ?6
            WHERE id = ?1
            "#,
            params![
                item.id,
                item.name,
                item.quantity,
                item.unit,
                item.value,
                item.location
            ],
        )?;
        Ok(rows > 0)
    }

    fn delete_stock(&mut self, id: &str) -> RepositoryResult<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM stock_items WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn set_stock_quantity(&mut self, id: &str, quantity: i64) -> RepositoryResult<bool> {
        let rows = self.conn().execute(
            "UPDATE stock_items SET quantity = ?2 WHERE id = ?1",
            params![id, quantity],
        )?;
        Ok(rows > 0)
    }
}
