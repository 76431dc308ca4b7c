// ==========================================
// 设备维保管理系统 - SQLite 实体存储
// ==========================================
// 职责: 以 BEGIN IMMEDIATE 事务实现作用域
// 红线: 作用域持有连接锁直到提交或回滚，期间无其他读写
// 红线: Drop 时未提交则 ROLLBACK
// ==========================================

use crate::db;
use crate::domain::types::EntityKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::store::{EntityScope, EntityStore};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SqliteEntityStore
// ==========================================
pub struct SqliteEntityStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEntityStore {
    /// 打开数据库文件并初始化 schema
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = db::open_and_init(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    ///
    /// 锁被污染时，持锁方的作用域已在 Drop 中回滚，可以安全接管
    fn get_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("数据库连接锁被污染，接管连接继续使用");
            poisoned.into_inner()
        })
    }
}

impl EntityStore for SqliteEntityStore {
    type Scope<'a> = SqliteScope<'a>;

    fn scope(&self) -> RepositoryResult<SqliteScope<'_>> {
        let conn = self.get_conn();
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(SqliteScope {
            conn,
            finished: false,
        })
    }
}

// ==========================================
// SqliteScope - 一个未提交的事务
// ==========================================
// 各实体的读写实现见 machine_repo / operator_repo / stock_repo /
// maintenance_repo / action_log_repo
pub struct SqliteScope<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl SqliteScope<'_> {
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl EntityScope for SqliteScope<'_> {
    fn exists(&self, kind: EntityKind, id: &str) -> RepositoryResult<bool> {
        let table = match kind {
            EntityKind::Machine => "machines",
            EntityKind::Sensor => "sensors",
            EntityKind::Operator => "operators",
            EntityKind::StockItem => "stock_items",
            EntityKind::Maintenance => "maintenance",
        };
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table);
        let found: bool = self.conn().query_row(&sql, params![id], |row| row.get(0))?;
        Ok(found)
    }

    fn commit(mut self) -> RepositoryResult<()> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for SqliteScope<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if std::thread::panicking() {
            tracing::warn!("作用域在 panic 中释放，回滚未提交写入");
        }
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            tracing::error!(error = %e, "作用域回滚失败");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::operator::Operator;
    use crate::repository::store::OperatorStore;

    fn setup_store() -> SqliteEntityStore {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        SqliteEntityStore::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn operator(id: &str) -> Operator {
        Operator {
            id: id.to_string(),
            name: format!("operator {}", id),
        }
    }

    #[test]
    fn test_commit_makes_writes_visible() {
        let store = setup_store();
        let mut scope = store.scope().unwrap();
        scope.insert_operator(&operator("op1")).unwrap();
        scope.commit().unwrap();

        let scope = store.scope().unwrap();
        assert!(scope.exists(EntityKind::Operator, "op1").unwrap());
    }

    #[test]
    fn test_drop_without_commit_rolls_back() {
        let store = setup_store();
        {
            let mut scope = store.scope().unwrap();
            scope.insert_operator(&operator("op1")).unwrap();
            assert!(scope.exists(EntityKind::Operator, "op1").unwrap());
        }

        let scope = store.scope().unwrap();
        assert!(!scope.exists(EntityKind::Operator, "op1").unwrap());
    }

    #[test]
    fn test_panic_inside_scope_rolls_back() {
        let store = setup_store();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut scope = store.scope().unwrap();
            scope.insert_operator(&operator("op1")).unwrap();
            panic!("请求中断");
        }));
        assert!(result.is_err());

        // 锁已被污染，仍可接管并读到回滚后的状态
        let scope = store.scope().unwrap();
        assert!(!scope.exists(EntityKind::Operator, "op1").unwrap());
    }
}
