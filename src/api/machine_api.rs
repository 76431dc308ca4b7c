// ==========================================
// 设备维保管理系统 - 机台 API
// ==========================================
// 职责: 机台 CRUD、传感器挂载
// 说明: 当天有维保记录的机台，读取时状态显示为"维保中"（只影响返回值）
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::api::dto::{MachineRequest, SensorRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::ReferenceValidator;
use crate::config::ConfigManager;
use crate::domain::machine::{Machine, Sensor};
use crate::domain::types::EntityKind;
use crate::repository::store::{EntityScope, EntityStore, MachineStore, MaintenanceStore};

// ==========================================
// MachineApi - 机台 API
// ==========================================
pub struct MachineApi<S> {
    store: Arc<S>,
    config: Arc<ConfigManager>,
    validator: ReferenceValidator,
}

impl<S: EntityStore> MachineApi<S> {
    pub fn new(store: Arc<S>, config: Arc<ConfigManager>) -> Self {
        Self {
            store,
            config,
            validator: ReferenceValidator::new(),
        }
    }

    /// 查询全部机台（含传感器与派生状态）
    pub fn list_machines(&self) -> ApiResult<Vec<Machine>> {
        // 配置可能与实体存储共享连接，先读配置再开作用域
        let label = self.config.maintenance_status_label()?;
        let today = today();

        let scope = self.store.scope()?;
        let machines = scope
            .list_machines()?
            .into_iter()
            .map(|machine| derive_status(&scope, machine, today, &label))
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(machines)
    }

    /// 查询单个机台
    pub fn get_machine(&self, id: &str) -> ApiResult<Machine> {
        let label = self.config.maintenance_status_label()?;

        let scope = self.store.scope()?;
        let machine = scope.find_machine(id)?.ok_or_else(|| not_found(id))?;
        derive_status(&scope, machine, today(), &label)
    }

    /// 新建机台（传感器一并挂载）
    pub fn create_machine(&self, request: MachineRequest) -> ApiResult<Machine> {
        let machine = request.into_machine(uuid::Uuid::new_v4().to_string())?;

        let mut scope = self.store.scope()?;
        self.validator.require_optional(
            &scope,
            EntityKind::Operator,
            machine.operator_id.as_deref(),
        )?;
        scope.insert_machine(&machine)?;
        scope.commit()?;

        tracing::info!(machine_id = %machine.id, sensors = machine.sensors.len(), "机台已新建");
        Ok(machine)
    }

    /// 修改机台（传感器列表整体替换，重新生成 ID）
    pub fn update_machine(&self, id: &str, request: MachineRequest) -> ApiResult<Machine> {
        let label = self.config.maintenance_status_label()?;
        let machine = request.into_machine(id.to_string())?;

        let mut scope = self.store.scope()?;
        if !self.validator.exists(&scope, EntityKind::Machine, id)? {
            return Err(not_found(id));
        }
        self.validator.require_optional(
            &scope,
            EntityKind::Operator,
            machine.operator_id.as_deref(),
        )?;
        if !scope.update_machine(&machine)? {
            return Err(not_found(id));
        }
        let machine = derive_status(&scope, machine, today(), &label)?;
        scope.commit()?;

        Ok(machine)
    }

    /// 删除机台及其传感器
    ///
    /// 引用该机台的维保记录保留（孤立引用）
    pub fn delete_machine(&self, id: &str) -> ApiResult<()> {
        let mut scope = self.store.scope()?;
        if !scope.delete_machine(id)? {
            return Err(not_found(id));
        }
        scope.commit()?;

        tracing::info!(machine_id = %id, "机台已删除");
        Ok(())
    }

    /// 查询机台的传感器
    pub fn list_sensors(&self, machine_id: &str) -> ApiResult<Vec<Sensor>> {
        let scope = self.store.scope()?;
        if !self.validator.exists(&scope, EntityKind::Machine, machine_id)? {
            return Err(not_found(machine_id));
        }
        Ok(scope.list_sensors(machine_id)?)
    }

    /// 为机台挂载新传感器
    pub fn add_sensor(&self, machine_id: &str, request: SensorRequest) -> ApiResult<Sensor> {
        let sensor = request.into_sensor()?;

        let mut scope = self.store.scope()?;
        if !self.validator.exists(&scope, EntityKind::Machine, machine_id)? {
            return Err(not_found(machine_id));
        }
        scope.insert_sensor(machine_id, &sensor)?;
        scope.commit()?;

        Ok(sensor)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("{}(id={})不存在", EntityKind::Machine, id))
}

fn derive_status<T>(scope: &T, machine: Machine, today: NaiveDate, label: &str) -> ApiResult<Machine>
where
    T: MaintenanceStore + ?Sized,
{
    let busy = scope.count_maintenance_on(&machine.id, today)? > 0;
    Ok(machine.with_derived_status(busy, label))
}
