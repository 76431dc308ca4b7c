// ==========================================
// 设备维保管理系统 - 操作员数据仓储
// ==========================================

use crate::domain::operator::Operator;
use crate::repository::error::RepositoryResult;
use crate::repository::sqlite_store::SqliteScope;
use crate::repository::store::OperatorStore;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

fn map_operator_row(row: &Row) -> SqliteResult<Operator> {
    Ok(Operator {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

impl OperatorStore for SqliteScope<'_> {
    fn find_operator(&self, id: &str) -> RepositoryResult<Option<Operator>> {
        let operator = self
            .conn()
            .query_row(
                "SELECT id, name FROM operators WHERE id = ?1",
                params![id],
                map_operator_row,
            )
            .optional()?;
        Ok(operator)
    }

    fn list_operators(&self) -> RepositoryResult<Vec<Operator>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, name FROM operators ORDER BY rowid")?;
        let operators = stmt
            .query_map([], map_operator_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(operators)
    }

    fn insert_operator(&mut self, operator: &Operator) -> RepositoryResult<()> {
        self.conn().execute(
            "INSERT INTO operators (id, name) VALUES (?1, ?2)",
            params![operator.id, operator.name],
        )?;
        Ok(())
    }

    fn update_operator(&mut self, operator: &Operator) -> RepositoryResult<bool> {
        let rows = self.conn().execute(
            "UPDATE operators SET name = ?2 WHERE id = ?1",
            params![operator.id, operator.name],
        )?;
        Ok(rows > 0)
    }

    fn delete_operator(&mut self, id: &str) -> RepositoryResult<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM operators WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}
