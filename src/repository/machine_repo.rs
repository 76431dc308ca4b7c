// ==========================================
// 设备维保管理系统 - 机台数据仓储
// ==========================================
// 职责: machines / sensors 表的读写映射
// 红线: Repository 不含业务逻辑（派生状态由 API 层计算）
// ==========================================

use crate::domain::machine::{Machine, Sensor};
use crate::repository::error::RepositoryResult;
use crate::repository::sqlite_store::SqliteScope;
use crate::repository::store::MachineStore;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::HashMap;

const MACHINE_COLUMNS: &str = "id, name, model, manufacturer, year, status, operator_id";

fn map_machine_row(row: &Row) -> SqliteResult<Machine> {
    Ok(Machine {
        id: row.get(0)?,
        name: row.get(1)?,
        model: row.get(2)?,
        manufacturer: row.get(3)?,
        year: row.get(4)?,
        status: row.get(5)?,
        operator_id: row.get(6)?,
        sensors: Vec::new(),
    })
}

/// 按 position 顺序写入传感器
fn write_sensors(conn: &Connection, machine_id: &str, sensors: &[Sensor]) -> SqliteResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO sensors (id, machine_id, position, name, sensor_type) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (position, sensor) in sensors.iter().enumerate() {
        stmt.execute(params![
            sensor.id,
            machine_id,
            position as i64,
            sensor.name,
            sensor.sensor_type
        ])?;
    }
    Ok(())
}

impl MachineStore for SqliteScope<'_> {
    fn find_machine(&self, id: &str) -> RepositoryResult<Option<Machine>> {
        let sql = format!("SELECT {} FROM machines WHERE id = ?1", MACHINE_COLUMNS);
        let machine = self
            .conn()
            .query_row(&sql, params![id], map_machine_row)
            .optional()?;

        match machine {
            Some(mut machine) => {
                machine.sensors = self.list_sensors(&machine.id)?;
                Ok(Some(machine))
            }
            None => Ok(None),
        }
    }

    fn list_machines(&self) -> RepositoryResult<Vec<Machine>> {
        let conn = self.conn();

        // 一次性取出全部传感器，按机台分组
        let mut sensor_stmt = conn.prepare(
            "SELECT machine_id, id, name, sensor_type FROM sensors ORDER BY machine_id, position",
        )?;
        let mut sensors_by_machine: HashMap<String, Vec<Sensor>> = HashMap::new();
        let rows = sensor_stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                Sensor {
                    id: row.get(1)?,
                    name: row.get(2)?,
                    sensor_type: row.get(3)?,
                },
            ))
        })?;
        for row in rows {
            let (machine_id, sensor) = row?;
            sensors_by_machine.entry(machine_id).or_default().push(sensor);
        }

        let sql = format!("SELECT {} FROM machines ORDER BY rowid", MACHINE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let machines = stmt
            .query_map([], map_machine_row)?
            .collect::<SqliteResult<Vec<_>>>()?
            .into_iter()
            .map(|mut machine| {
                machine.sensors = sensors_by_machine.remove(&machine.id).unwrap_or_default();
                machine
            })
            .collect();

        Ok(machines)
    }

    fn insert_machine(&mut self, machine: &Machine) -> RepositoryResult<()> {
        let conn = self.conn();
        conn.execute(
            r#"
            INSERT INTO machines (id, name, model, manufacturer, year, status, operator_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                machine.id,
                machine.name,
                machine.model,
                machine.manufacturer,
                machine.year,
                machine.status,
                machine.operator_id,
            ],
        )?;
        write_sensors(conn, &machine.id, &machine.sensors)?;
        Ok(())
    }

    fn update_machine(&mut self, machine: &Machine) -> RepositoryResult<bool> {
        let conn = self.conn();
        let rows = conn.execute(
            r#"
            UPDATE machines
            SET name = ?2, model = ?3, manufacturer = ?4, year = ?5, status = ?6, operator_id = ?7
            WHERE id = ?1
            "#,
            params![
                machine.id,
                machine.name,
                machine.model,
                machine.manufacturer,
                machine.year,
                machine.status,
                machine.operator_id,
            ],
        )?;
        if rows == 0 {
            return Ok(false);
        }

        conn.execute("DELETE FROM sensors WHERE machine_id = ?1", params![machine.id])?;
        write_sensors(conn, &machine.id, &machine.sensors)?;
        Ok(true)
    }

    fn delete_machine(&mut self, id: &str) -> RepositoryResult<bool> {
        let conn = self.conn();
        conn.execute("DELETE FROM sensors WHERE machine_id = ?1", params![id])?;
        let rows = conn.execute("DELETE FROM machines WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_sensors(&self, machine_id: &str) -> RepositoryResult<Vec<Sensor>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, sensor_type FROM sensors WHERE machine_id = ?1 ORDER BY position",
        )?;
        let sensors = stmt
            .query_map(params![machine_id], |row| {
                Ok(Sensor {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    sensor_type: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(sensors)
    }

    fn insert_sensor(&mut self, machine_id: &str, sensor: &Sensor) -> RepositoryResult<()> {
        self.conn().execute(
            r#"
            INSERT INTO sensors (id, machine_id, position, name, sensor_type)
            VALUES (
                ?1, ?2,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM sensors WHERE machine_id = ?2),
                ?3, ?4
            )
            "#,
            params![sensor.id, machine_id, sensor.name, sensor.sensor_type],
        )?;
        Ok(())
    }

    fn clear_operator(&mut self, operator_id: &str) -> RepositoryResult<usize> {
        let rows = self.conn().execute(
            "UPDATE machines SET operator_id = NULL WHERE operator_id = ?1",
            params![operator_id],
        )?;
        Ok(rows)
    }
}
