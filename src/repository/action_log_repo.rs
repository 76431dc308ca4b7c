// ==========================================
// 设备维保管理系统 - 操作日志数据仓储
// ==========================================
// 依据: action_log 表
// 红线: 日志与业务写入在同一作用域提交
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::repository::error::RepositoryResult;
use crate::repository::sqlite_store::SqliteScope;
use crate::repository::store::ActionLogStore;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Result as SqliteResult, Row};

fn map_action_log_row(row: &Row) -> SqliteResult<ActionLog> {
    let action_type_str: String = row.get(1)?;
    let action_type = ActionType::from_str(&action_type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("未知操作类型: {}", action_type_str).into(),
        )
    })?;

    Ok(ActionLog {
        action_id: row.get(0)?,
        action_type,
        action_ts: row.get::<_, NaiveDateTime>(2)?,
        entity_id: row.get(3)?,
        payload_json: row
            .get::<_, Option<String>>(4)?
            .and_then(|s| serde_json::from_str(&s).ok()),
        detail: row.get(5)?,
    })
}

impl ActionLogStore for SqliteScope<'_> {
    fn insert_action_log(&mut self, log: &ActionLog) -> RepositoryResult<()> {
        self.conn().execute(
            r#"
            INSERT INTO action_log (
                action_id, action_type, action_ts, entity_id, payload_json, detail
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                log.action_id,
                log.action_type.as_str(),
                log.action_ts,
                log.entity_id,
                log.payload_json.as_ref().map(|v| v.to_string()),
                log.detail,
            ],
        )?;
        Ok(())
    }

    fn list_action_logs(&self, limit: usize) -> RepositoryResult<Vec<ActionLog>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT action_id, action_type, action_ts, entity_id, payload_json, detail
            FROM action_log
            ORDER BY action_ts DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;
        let logs = stmt
            .query_map(params![limit as i64], map_action_log_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }
}
