// ==========================================
// MachineApi / OperatorApi / StockApi 集成测试
// ==========================================
// 测试范围:
// 1. 机台 CRUD 与传感器挂载
// 2. 读取时派生"维保中"状态（不回写存储）
// 3. 删除操作员时解除机台指派
// 4. 备件 CRUD 校验
// ==========================================

mod helpers;

use chrono::{Duration, Local};
use helpers::api_test_helper::*;
use machine_mind::api::dto::{OperatorRequest, SensorRequest, StockRequest};
use machine_mind::api::ApiError;
use machine_mind::config::config_keys;
use machine_mind::repository::{EntityStore, MachineStore};

fn today_str() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

// ==========================================
// 机台
// ==========================================

#[test]
fn test_create_machine_含传感器() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let mut request = machine_request("Press", None);
    request.sensors = vec![
        SensorRequest {
            name: "主轴温度".to_string(),
            sensor_type: "temperature".to_string(),
        },
        SensorRequest {
            name: "液压".to_string(),
            sensor_type: "pressure".to_string(),
        },
    ];

    let machine = env.machine_api.create_machine(request).expect("创建失败");
    assert_eq!(machine.sensors.len(), 2);

    let stored = env.machine_api.get_machine(&machine.id).expect("查询失败");
    let names: Vec<&str> = stored.sensors.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["主轴温度", "液压"], "传感器应保持顺序");
    assert_eq!(stored.status, "running");
}

#[test]
fn test_create_machine_空名称() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let err = env
        .machine_api
        .create_machine(machine_request("   ", None))
        .expect_err("空名称应失败");
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_create_machine_操作员不存在() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let err = env
        .machine_api
        .create_machine(machine_request("Press", Some("ghost")))
        .expect_err("操作员不存在应失败");
    assert!(matches!(err, ApiError::InvalidReference { .. }));
    assert!(env.machine_api.list_machines().unwrap().is_empty());
}

#[test]
fn test_update_machine() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let operator = env.seed_operator("Alice");
    let machine = env.seed_machine("Press");

    let mut request = machine_request("Press II", Some(&operator.id));
    request.status = "idle".to_string();
    let updated = env
        .machine_api
        .update_machine(&machine.id, request)
        .expect("修改失败");
    assert_eq!(updated.name, "Press II");
    assert_eq!(updated.operator_id.as_deref(), Some(operator.id.as_str()));

    let err = env
        .machine_api
        .update_machine("missing", machine_request("X", None))
        .expect_err("不存在应失败");
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_delete_machine_保留维保记录() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let machine = env.seed_machine("Press");

    let record = env
        .maintenance_api
        .create_maintenance(maintenance_request(&machine.id, "2026-03-01", &[]))
        .expect("创建维保失败");

    env.machine_api.delete_machine(&machine.id).expect("删除失败");

    let err = env
        .machine_api
        .get_machine(&machine.id)
        .expect_err("删除后应查不到");
    assert!(matches!(err, ApiError::NotFound(_)));

    // 维保记录保留孤立引用
    let stored = env
        .maintenance_api
        .get_maintenance(&record.id)
        .expect("维保记录应保留");
    assert_eq!(stored.machine_id, machine.id);
}

// ==========================================
// 派生状态
// ==========================================

#[test]
fn test_derived_status_当天有维保() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let busy = env.seed_machine("Busy");
    let idle = env.seed_machine("Idle");

    env.maintenance_api
        .create_maintenance(maintenance_request(&busy.id, &today_str(), &[]))
        .expect("创建维保失败");

    let fetched = env.machine_api.get_machine(&busy.id).expect("查询失败");
    assert_eq!(fetched.status, "under maintenance");

    let listed = env.machine_api.list_machines().expect("查询失败");
    let idle_status = listed
        .iter()
        .find(|m| m.id == idle.id)
        .map(|m| m.status.clone());
    assert_eq!(idle_status.as_deref(), Some("running"));

    // 派生状态不回写
    let scope = env.store.scope().expect("无法打开作用域");
    let raw = scope
        .find_machine(&busy.id)
        .expect("查询失败")
        .expect("机台应存在");
    assert_eq!(raw.status, "running");
}

#[test]
fn test_derived_status_其他日期不影响() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let machine = env.seed_machine("Press");

    let tomorrow = (Local::now().date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();
    env.maintenance_api
        .create_maintenance(maintenance_request(&machine.id, &tomorrow, &[]))
        .expect("创建维保失败");

    let fetched = env.machine_api.get_machine(&machine.id).expect("查询失败");
    assert_eq!(fetched.status, "running");
}

#[test]
fn test_derived_status_标签可配置() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let machine = env.seed_machine("Press");
    env.config
        .set_config_value(config_keys::MACHINE_MAINTENANCE_STATUS_LABEL, "维保中")
        .expect("写配置失败");

    env.maintenance_api
        .create_maintenance(maintenance_request(&machine.id, &today_str(), &[]))
        .expect("创建维保失败");

    let fetched = env.machine_api.get_machine(&machine.id).expect("查询失败");
    assert_eq!(fetched.status, "维保中");
}

// ==========================================
// 传感器
// ==========================================

#[test]
fn test_add_sensor() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let machine = env.seed_machine("Press");

    let sensor = env
        .machine_api
        .add_sensor(
            &machine.id,
            SensorRequest {
                name: "振动".to_string(),
                sensor_type: "vibration".to_string(),
            },
        )
        .expect("挂载失败");

    let sensors = env.machine_api.list_sensors(&machine.id).expect("查询失败");
    assert_eq!(sensors, vec![sensor]);

    let err = env
        .machine_api
        .add_sensor(
            "missing",
            SensorRequest {
                name: "振动".to_string(),
                sensor_type: "vibration".to_string(),
            },
        )
        .expect_err("机台不存在应失败");
    assert_eq!(err.status_code(), 404);
}

// ==========================================
// 操作员
// ==========================================

#[test]
fn test_delete_operator_解除机台指派() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let operator = env.seed_operator("Alice");
    let machine = env
        .machine_api
        .create_machine(machine_request("Press", Some(&operator.id)))
        .expect("创建失败");

    env.operator_api
        .delete_operator(&operator.id)
        .expect("删除失败");

    let fetched = env.machine_api.get_machine(&machine.id).expect("查询失败");
    assert_eq!(fetched.operator_id, None, "机台应解除指派");
    assert!(env.operator_api.list_operators().unwrap().is_empty());

    let err = env
        .operator_api
        .delete_operator(&operator.id)
        .expect_err("重复删除应失败");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_update_operator() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let operator = env.seed_operator("Alice");

    let updated = env
        .operator_api
        .update_operator(
            &operator.id,
            OperatorRequest {
                name: "Alice Chen".to_string(),
            },
        )
        .expect("修改失败");
    assert_eq!(updated.name, "Alice Chen");
    assert_eq!(
        env.operator_api.get_operator(&operator.id).unwrap().name,
        "Alice Chen"
    );
}

// ==========================================
// 备件
// ==========================================

#[test]
fn test_stock_crud() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let bolt = env.seed_stock("bolt", 10);

    let updated = env
        .stock_api
        .update_stock(
            &bolt.id,
            StockRequest {
                name: "bolt M8".to_string(),
                quantity: 25,
                unit: "pcs".to_string(),
                value: 0.8,
                location: "B-02".to_string(),
            },
        )
        .expect("修改失败");
    assert_eq!(updated.quantity, 25);
    assert_eq!(env.stock_quantity(&bolt.id), 25);

    env.stock_api.delete_stock(&bolt.id).expect("删除失败");
    assert!(env.stock_api.list_stock().unwrap().is_empty());
    assert_eq!(
        env.stock_api.get_stock(&bolt.id).unwrap_err().status_code(),
        404
    );
}

#[test]
fn test_create_stock_负数量() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let err = env
        .stock_api
        .create_stock(StockRequest {
            name: "bolt".to_string(),
            quantity: -1,
            unit: "pcs".to_string(),
            value: 1.0,
            location: String::new(),
        })
        .expect_err("负数量应失败");
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
