// ==========================================
// 车队预测性维护系统 - 维修项领域模型
// ==========================================
// 状态机: agendada → concluida | agendada → atrasada → concluida
// ==========================================

use crate::domain::types::{MaintenanceStatus, MaintenanceType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceItem {
    pub id: i64,
    pub vehicle_id: i64,
    pub item_type: MaintenanceType,
    pub description: String,
    pub scheduled_date: NaiveDate,
    pub status: MaintenanceStatus,
    pub diagnostic_id: Option<i64>,
    pub failure_probability: Option<f64>,  // 来自关联诊断，用于排序

    // ===== 完工信息 =====
    pub completed_on: Option<NaiveDate>,
    pub completed_km: Option<f64>,
    pub cost: Option<f64>,
    pub parts: Option<String>,
    pub notes: Option<String>,
}

/// 排期请求（日期可能缺失，入库前校验）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMaintenanceItem {
    pub vehicle_id: i64,
    pub item_type: MaintenanceType,
    pub description: String,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub diagnostic_id: Option<i64>,
    #[serde(default)]
    pub failure_probability: Option<f64>,
}

/// 完工登记
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceCompletion {
    pub completed_on: NaiveDate,
    #[serde(default)]
    pub completed_km: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub parts: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}
