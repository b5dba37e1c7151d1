// ==========================================
// 车队预测性维护系统 - 车辆与部件领域模型
// ==========================================
// 聚合根: Vehicle 持有其 Component
// 其他记录 (事件/诊断/告警/维修) 通过 vehicle_id 关联
// ==========================================

use crate::domain::types::VehicleStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Vehicle - 车辆
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub plate: String,                     // 车牌 (唯一)
    pub model: String,                     // 车型
    pub year: i32,                         // 年份
    pub engine: String,                    // 发动机型号
    pub odometer_km: f64,                  // 当前里程 (单调不减)
    pub registered_on: NaiveDate,          // 入队日期
    pub last_oil_change_km: Option<f64>,   // 上次换油里程
    pub status: VehicleStatus,             // 由部件健康度推导
    pub active: bool,                      // 停用后不再参与统计
}

/// 新车入队请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVehicle {
    pub plate: String,
    pub model: String,
    pub year: i32,
    pub engine: String,
    pub odometer_km: f64,
    pub registered_on: NaiveDate,
    #[serde(default)]
    pub last_oil_change_km: Option<f64>,
}

// ==========================================
// Component - 部件健康度
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: i64,
    pub vehicle_id: i64,
    pub name: String,                      // 部件名 (与系统标签对应)
    pub health_pct: u8,                    // 健康度 [0,100]
    pub last_inspection: Option<NaiveDate>,
}

/// 新部件登记
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComponent {
    pub vehicle_id: i64,
    pub name: String,
    pub health_pct: u8,
    #[serde(default)]
    pub last_inspection: Option<NaiveDate>,
}

/// 车辆详情（车辆 + 部件 + 最近维修 + 最近告警）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleDetail {
    pub vehicle: Vehicle,
    pub components: Vec<Component>,
    pub maintenance: Vec<crate::domain::maintenance::MaintenanceItem>,
    pub alerts: Vec<crate::domain::alert::Alert>,
}

/// 车辆列表行（含平均健康度与未读告警数）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub vehicle: Vehicle,
    pub average_health: f64,
    pub unread_alerts: i64,
}
